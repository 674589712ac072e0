//! Conversion of the laid-out graph into an editable document.

use std::{io, path::Path, process::Command};

use log::debug;

use super::Error;

/// Converts a laid-out graph file into another format.
pub trait FormatConverter {
    /// Reads `input` and writes the converted document to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] when the converter cannot be started
    /// and [`Error::Failed`] when it runs but does not succeed.
    fn convert(&self, input: &Path, output: &Path) -> Result<(), Error>;
}

/// [`FormatConverter`] that runs `<program> <input> -o <output>`.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    program: String,
}

impl ExternalConverter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for ExternalConverter {
    fn default() -> Self {
        Self::new("graphviz2drawio")
    }
}

impl FormatConverter for ExternalConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), Error> {
        debug!(program = self.program.as_str(), input:? = input, output:? = output; "Running converter");

        let result = Command::new(&self.program)
            .arg(input)
            .arg("-o")
            .arg(output)
            .output();

        match result {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                Err(Error::Failed(format!(
                    "`{}` exited with {}: {}",
                    self.program,
                    out.status,
                    stderr.trim()
                )))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(Error::Unavailable {
                program: self.program.clone(),
                hint: format!("install `{}` and make sure it is on PATH", self.program),
            }),
            Err(err) => Err(Error::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_unavailable() {
        let converter = ExternalConverter::new("infragram-no-such-converter");
        let result = converter.convert(Path::new("in.dot"), Path::new("out.drawio"));
        assert!(matches!(
            result,
            Err(Error::Unavailable { program, .. }) if program == "infragram-no-such-converter"
        ));
    }
}
