//! CSV file output

use super::lines::Line;
use crate::domain::Result;
use std::path::Path;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Writes rows to a CSV file
///
/// With `overwrite` set, or when the file does not exist yet, the file is
/// (re)created and starts with `header`. Otherwise the rows are appended and
/// the header is not repeated. Returns the number of rows written.
pub async fn write_csv<'a>(
    path: &Path,
    header: &str,
    lines: impl IntoIterator<Item = &'a Line>,
    overwrite: bool,
) -> Result<usize> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let fresh = overwrite || !fs::try_exists(path).await?;
    let mut buffer = String::new();
    if fresh {
        buffer.push_str(header);
        buffer.push('\n');
    }

    let mut count = 0;
    for line in lines {
        buffer.push_str(&line.text);
        buffer.push('\n');
        count += 1;
    }

    let mut file = if fresh {
        fs::File::create(path).await?
    } else {
        OpenOptions::new().append(true).open(path).await?
    };
    file.write_all(buffer.as_bytes()).await?;
    file.flush().await?;

    tracing::debug!(file = %path.display(), rows = count, fresh, "CSV file written");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_header_written_once_when_appending() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Form.csv");
        let first = [Line::new("a", None, "1,a")];
        let second = [Line::new("b", None, "2,b")];

        write_csv(&path, "n,KEY", &first, false).await.unwrap();
        write_csv(&path, "n,KEY", &second, false).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "n,KEY\n1,a\n2,b\n");
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Form.csv");
        std::fs::write(&path, "old\n").unwrap();

        let rows = [Line::new("b", None, "2,b")];
        let written = write_csv(&path, "n,KEY", &rows, true).await.unwrap();

        assert_eq!(written, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "n,KEY\n2,b\n");
    }
}
