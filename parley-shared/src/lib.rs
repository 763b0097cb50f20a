pub mod broker;
pub mod directory;
pub mod jwt;
pub mod live;
pub mod messages;
pub mod settings;
pub mod store;
pub mod telemetry;
pub mod users;

///
/// Format an error together with its whole chain of sources.
///
/// Used by the `Debug` implementations of error types that are logged by the request tracing.
///
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
