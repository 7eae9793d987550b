use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use schicksal_normalize::sample::{RawSample, Sample};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        if let Output::File { path, .. } = self {
            log::info!("Wrote {}", path.display());
        }
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read a sample hierarchy from a JSON file of nested number arrays
///
/// `[1, 2]` is one experiment, `[[1, 2], [3]]` a group of experiments and
/// `[[[1], [2]], [[3]]]` a set of groups.
///
/// # Errors
///
/// Returns error if the file cannot be opened or parsed, or the nesting is invalid
pub fn read_sample_file<P>(path: P) -> anyhow::Result<Sample>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let raw: RawSample = read_json_file("sample", path)?;
    let sample = Sample::try_from(raw)
        .with_context(|| format!("Invalid sample hierarchy in {}", path.display()))?;
    log::debug!(
        "Loaded {} values in {} leaves from {}",
        sample.pooled_len(),
        sample.leaves().count(),
        path.display()
    );
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use schicksal_normalize::sample::{Leaf, Node};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_read_sample_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.json");
        fs::write(&path, "[[9, 4.5, 6], [10, 5, 7]]").unwrap();

        let sample = read_sample_file(&path).unwrap();
        let expected = Sample::from(
            Node::new(vec![
                Leaf::new(vec![9.0, 4.5, 6.0]).into(),
                Leaf::new(vec![10.0, 5.0, 7.0]).into(),
            ])
            .unwrap(),
        );
        assert_eq!(sample, expected);
    }

    #[test]
    fn test_saved_sample_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.json");
        let raw = RawSample::Node(vec![
            RawSample::Node(vec![RawSample::Leaf(vec![1.0, 2.0])]),
            RawSample::Node(vec![RawSample::Leaf(vec![3.0]), RawSample::Leaf(vec![])]),
        ]);

        Output::save_json(&raw, Some(path.clone())).unwrap();
        let sample = read_sample_file(&path).unwrap();
        assert_eq!(sample.depth(), 2);
        assert_eq!(sample.to_raw(), raw);
    }

    #[test]
    fn test_read_sample_file_errors() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(read_sample_file(&missing).is_err());

        let malformed = dir.path().join("malformed.json");
        fs::write(&malformed, "[1, [2]]").unwrap();
        assert!(read_sample_file(&malformed).is_err());

        let uneven = dir.path().join("uneven.json");
        fs::write(&uneven, "[[1, 2], [[3]]]").unwrap();
        let err = read_sample_file(&uneven).unwrap_err();
        assert!(err.to_string().contains("Invalid sample hierarchy"));

        let too_deep = dir.path().join("deep.json");
        fs::write(&too_deep, "[[[[1]]]]").unwrap();
        assert!(read_sample_file(&too_deep).is_err());
    }
}
