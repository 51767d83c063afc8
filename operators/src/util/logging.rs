use snafu::ResultExt;
use tracing::{Dispatch, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer, fmt::MakeWriter, layer::Filter, prelude::*, registry::LookupSpan,
};

use crate::config::{self, get_config_element};
use crate::error;
use crate::util::Result;

/// Creates a `Dispatch` that logs to `stderr`, filtered by `log_spec`,
/// e.g. `info,geopatch_operators=debug`.
///
/// The dispatch is meant to be injected into the importers and is never installed globally.
pub fn dispatch_from_spec(log_spec: &str) -> Result<Dispatch> {
    dispatch_with_writer(log_spec, std::io::stderr)
}

/// Creates a `Dispatch` from the `[logging]` section of the settings
pub fn dispatch_from_config() -> Result<Dispatch> {
    let logging_config: config::Logging = get_config_element()?;

    dispatch_from_spec(&logging_config.log_spec)
}

/// Creates a `Dispatch` that writes formatted events to `writer`
pub fn dispatch_with_writer<W>(log_spec: &str, writer: W) -> Result<Dispatch>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_new(log_spec).context(error::InvalidLogSpec)?;

    let registry =
        tracing_subscriber::Registry::default().with(console_layer_with_filter(filter, writer));

    Ok(Dispatch::new(registry))
}

fn console_layer_with_filter<S, F, W>(filter: F, writer: W) -> impl Layer<S>
where
    S: Subscriber,
    for<'a> S: LookupSpan<'a>,
    F: Filter<S> + 'static,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter)
}
