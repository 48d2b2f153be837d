//! Presenting itineraries on a terminal or in a file.

use crate::error::{Result, TourError};
use crate::itinerary::ItineraryResponse;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Shown in chat when the model answers with nothing but whitespace.
pub const NO_NARRATIVE: &str = "Assistant returned no narrative.";

const DIVIDER_WIDTH: usize = 60;

/// Writes responses framed by dividers.
pub struct OutputPresenter<W: Write> {
    out: W,
}

impl<W: Write> OutputPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Print an itinerary exactly as the model returned it.
    pub fn present(&mut self, response: &ItineraryResponse) -> Result<()> {
        self.present_text(response.text())
    }

    /// Print `text` unchanged between two divider lines.
    pub fn present_text(&mut self, text: &str) -> Result<()> {
        let divider = "-".repeat(DIVIDER_WIDTH);
        writeln!(self.out, "{}", divider)?;
        self.out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            writeln!(self.out)?;
        }
        writeln!(self.out, "{}", divider)?;
        self.out.flush()?;
        Ok(())
    }

    /// Print a status line.
    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    /// Print a prompt without a newline and flush it.
    pub fn prompt(&mut self, text: &str) -> Result<()> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Write an itinerary to `path` byte for byte, creating parent directories.
pub fn save_itinerary(response: &ItineraryResponse, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| TourError::io(parent, e))?;
        }
    }

    fs::write(path, response.text()).map_err(|e| TourError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(text: &str) -> String {
        let mut presenter = OutputPresenter::new(Vec::new());
        presenter.present(&ItineraryResponse::new(text)).unwrap();
        String::from_utf8(presenter.into_inner()).unwrap()
    }

    #[test]
    fn test_present_reproduces_response_verbatim() {
        let text = "  Day 1: Museums\n\n  Day 2: Beach  ";
        let rendered = render(text);
        let divider = "-".repeat(60);

        assert_eq!(rendered, format!("{divider}\n{text}\n{divider}\n"));
    }

    #[test]
    fn test_present_does_not_double_trailing_newline() {
        let divider = "-".repeat(60);
        assert_eq!(render("Day 1\n"), format!("{divider}\nDay 1\n{divider}\n"));
    }

    #[test]
    fn test_save_itinerary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trips").join("lisbon.md");
        let response = ItineraryResponse::new("# Lisbon\nDay 1: Belem\n");

        save_itinerary(&response, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Lisbon\nDay 1: Belem\n");
    }
}
