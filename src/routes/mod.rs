mod contact;
mod health_check;

pub use contact::*;
pub use health_check::*;

/// Walks the source chain of an error when formatting it for logs, so the
/// full cause ends up in the bunyan output.
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
