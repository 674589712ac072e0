//! Rendering through the Graphviz `dot` executable.

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::Command,
};

use graphviz_rust::{
    cmd::{CommandArg, Format},
    dot_structures::Graph,
    exec_dot,
};
use log::{debug, info};

use super::{Error, dot};
use crate::config::ImageFormat;

const DOT_PROGRAM: &str = "dot";
const DOT_HINT: &str =
    "install Graphviz (https://graphviz.org/download/) and make sure `dot` is on PATH";

/// Files produced by one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFiles {
    /// One image per requested format, in request order.
    pub images: Vec<PathBuf>,
    /// The laid-out graph description (`<base>.dot`).
    pub layout: PathBuf,
}

/// Lays out a graph and writes the rendered outputs.
pub trait RenderBackend {
    /// Renders `graph` once, writing `<base>.<ext>` for every format in
    /// `formats` and `<base>.dot` with the laid-out graph.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unavailable`] before anything is written when the
    /// layout engine cannot be found.
    fn render(
        &self,
        graph: &Graph,
        base: &Path,
        formats: &[ImageFormat],
    ) -> Result<RenderedFiles, Error>;
}

/// [`RenderBackend`] that runs the Graphviz `dot` executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphvizRenderer;

impl GraphvizRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Checks that `dot` can be started.
    fn probe(&self) -> Result<(), Error> {
        match Command::new(DOT_PROGRAM).arg("-V").output() {
            Ok(output) => {
                debug!(
                    version = String::from_utf8_lossy(&output.stderr).trim();
                    "Found Graphviz"
                );
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(Error::Unavailable {
                program: DOT_PROGRAM.to_string(),
                hint: DOT_HINT.to_string(),
            }),
            Err(err) => Err(Error::Io(err)),
        }
    }
}

impl RenderBackend for GraphvizRenderer {
    fn render(
        &self,
        graph: &Graph,
        base: &Path,
        formats: &[ImageFormat],
    ) -> Result<RenderedFiles, Error> {
        self.probe()?;

        if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let images: Vec<PathBuf> = formats
            .iter()
            .map(|format| output_path(base, format.extension()))
            .collect();
        let layout = output_path(base, "dot");

        let mut args = Vec::with_capacity(2 * (formats.len() + 1));
        for (format, path) in formats.iter().zip(&images) {
            args.push(CommandArg::Format(graphviz_format(*format)));
            args.push(CommandArg::Output(path.to_string_lossy().into_owned()));
        }
        args.push(CommandArg::Format(Format::Dot));
        args.push(CommandArg::Output(layout.to_string_lossy().into_owned()));

        exec_dot(dot::to_source(graph), args).map_err(|err| Error::Failed(err.to_string()))?;

        info!(images = images.len(), layout:? = layout; "Graphviz render complete");
        Ok(RenderedFiles { images, layout })
    }
}

/// `<base>.<extension>`, keeping any dots already in the base name.
pub(crate) fn output_path(base: &Path, extension: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}

fn graphviz_format(format: ImageFormat) -> Format {
    match format {
        ImageFormat::Png => Format::Png,
        ImageFormat::Svg => Format::Svg,
        ImageFormat::Pdf => Format::Pdf,
        ImageFormat::Jpg => Format::Jpg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_appends_extension() {
        assert_eq!(
            output_path(Path::new("out/diagram"), "png"),
            PathBuf::from("out/diagram.png")
        );
        assert_eq!(
            output_path(Path::new("contoso.v2"), "dot"),
            PathBuf::from("contoso.v2.dot")
        );
    }
}
