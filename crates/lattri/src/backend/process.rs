//! Spawning external tools and the literal-text protocol they speak.
//!
//! Requests are nested integer lists printed like `[[0, 1], [1, 1]]`; responses
//! are the same syntax, possibly with `{}` or `()` as brackets.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::error::{Result, TriangError};

/// Captured result of one tool run.
pub(crate) struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// `dir/name`, or bare `name` (resolved through `PATH`) when `dir` is empty.
pub(crate) fn tool_path(dir: &Path, name: &str) -> PathBuf {
    if dir.as_os_str().is_empty() {
        PathBuf::from(name)
    } else {
        dir.join(name)
    }
}

/// Run `program args…`, feed `input` on stdin and capture both output streams.
///
/// Failing to start the process is an error; the exit status is left to the caller.
pub(crate) fn run(program: &Path, args: &[&str], input: &str) -> Result<ToolOutput> {
    let name = display_name(program);
    debug!(tool = %name, ?args, bytes = input.len(), "spawning");
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| TriangError::tool(&name, format!("could not start: {e}")))?;
    // feed stdin from a helper thread so a chatty tool cannot deadlock on a full pipe
    let writer = child.stdin.take().map(|mut stdin| {
        let data = input.as_bytes().to_vec();
        std::thread::spawn(move || stdin.write_all(&data))
    });
    let output = child
        .wait_with_output()
        .map_err(|e| TriangError::tool(&name, format!("could not collect output: {e}")))?;
    if let Some(handle) = writer {
        match handle.join() {
            Ok(Ok(())) => {}
            // a tool may legitimately stop reading early; its exit status tells the story
            Ok(Err(e)) => debug!(tool = %name, error = %e, "stdin write failed"),
            Err(_) => debug!(tool = %name, "stdin writer panicked"),
        }
    }
    Ok(ToolOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

pub(crate) fn display_name(program: &Path) -> String {
    program
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

/// Human-readable exit description; signal 9 gets an out-of-memory hint.
pub(crate) fn describe_exit(status: &ExitStatus) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            let hint = if sig == 9 {
                " (killed; this usually means the tool ran out of memory)"
            } else {
                ""
            };
            return format!("terminated by signal {sig}{hint}");
        }
    }
    match status.code() {
        Some(code) => format!("exited with code {code}"),
        None => "terminated abnormally".to_string(),
    }
}

/// `[[a, b], [c, d]]`.
pub(crate) fn list_literal<T: ToString>(rows: &[Vec<T>]) -> String {
    let inner: Vec<String> = rows
        .iter()
        .map(|r| {
            let items: Vec<String> = r.iter().map(ToString::to_string).collect();
            format!("[{}]", items.join(", "))
        })
        .collect();
    format!("[{}]", inner.join(", "))
}

/// `{{a, b}, {c, d}}`.
pub(crate) fn brace_literal(rows: &[Vec<usize>]) -> String {
    list_literal(rows).replace('[', "{").replace(']', "}")
}

/// Homogenized points `(p, 1)` as a list literal.
pub(crate) fn homogenized_literal(points: &[Vec<i64>]) -> String {
    let hom: Vec<Vec<i64>> = points
        .iter()
        .map(|p| p.iter().copied().chain(std::iter::once(1)).collect())
        .collect();
    list_literal(&hom)
}

/// Parse a nested index list written with `[]`, `{}` or `()` brackets.
pub(crate) fn parse_simplices(tool: &str, text: &str) -> Result<Vec<Vec<usize>>> {
    let normalized: String = text
        .trim()
        .chars()
        .map(|c| match c {
            '{' | '(' => '[',
            '}' | ')' => ']',
            c => c,
        })
        .collect();
    serde_json::from_str::<Vec<Vec<usize>>>(&normalized)
        .map_err(|_| TriangError::parse(tool, text.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_round_trip_through_parser() {
        let rows = vec![vec![0usize, 1, 2], vec![1, 2, 3]];
        assert_eq!(list_literal(&rows), "[[0, 1, 2], [1, 2, 3]]");
        assert_eq!(brace_literal(&rows), "{{0, 1, 2}, {1, 2, 3}}");
        assert_eq!(parse_simplices("t", &brace_literal(&rows)).unwrap(), rows);
        assert_eq!(parse_simplices("t", " ((0, 1), (1, 2))\n").unwrap(), vec![vec![0, 1], vec![1, 2]]);
        assert_eq!(homogenized_literal(&[vec![2, -1]]), "[[2, -1, 1]]");
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_simplices("t", "Segmentation fault"),
            Err(TriangError::Parse { .. })
        ));
    }

    #[test]
    fn tool_path_uses_path_lookup_for_empty_dir() {
        assert_eq!(tool_path(Path::new(""), "x"), PathBuf::from("x"));
        assert_eq!(tool_path(Path::new("/opt/bin"), "x"), PathBuf::from("/opt/bin/x"));
    }

    #[test]
    fn missing_tool_is_a_tool_error() {
        let r = run(Path::new("/nonexistent/lattri-tool"), &[], "");
        assert!(matches!(r, Err(TriangError::Tool { .. })));
    }
}
