//! Remote shell command builders
//!
//! Every command Slipway sends to the remote host is built here, so quoting
//! lives in exactly one place. Paths are always single-quoted.

/// Marker written to stderr by the activation script when the release
/// directory does not exist.
pub const MISSING_RELEASE_MARKER: &str = "slipway: missing release directory";

/// Quote a string for a POSIX shell.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

fn quote_all<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ")
}

/// `mkdir -p` for one or more directories (idempotent)
pub fn ensure_dirs<'a, I>(dirs: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    format!("mkdir -p {}", quote_all(dirs))
}

/// Print the ledger file, or nothing when it does not exist yet
pub fn read_ledger(ledger_path: &str) -> String {
    let path = shell_quote(ledger_path);
    format!("if [ -f {path} ]; then cat {path}; fi")
}

/// Print the target of the current pointer, or nothing before first activation
pub fn read_link(link: &str) -> String {
    format!("readlink {} 2>/dev/null || true", shell_quote(link))
}

/// Rename an uploaded staging file over the ledger in one step
pub fn commit_ledger(staged_path: &str, ledger_path: &str) -> String {
    format!(
        "mv -f {} {}",
        shell_quote(staged_path),
        shell_quote(ledger_path)
    )
}

/// Delete release directories
pub fn remove_dirs<'a, I>(dirs: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    format!("rm -rf {}", quote_all(dirs))
}

/// Repoint `link` at `release_dir` if, and only if, the directory exists.
///
/// The new link is created beside the old one and renamed over it, so readers
/// see either the old target or the new one. A missing directory leaves the
/// link alone and reports `MISSING_RELEASE_MARKER` on stderr.
pub fn activate(release_dir: &str, link: &str) -> String {
    let dir = shell_quote(release_dir);
    let tmp = shell_quote(&format!("{link}.tmp"));
    let link = shell_quote(link);
    format!(
        "if [ -d {dir} ]; then ln -sfn {dir} {tmp} && mv -Tf {tmp} {link}; \
         else echo {} {dir} >&2; fi",
        shell_quote(MISSING_RELEASE_MARKER)
    )
}
