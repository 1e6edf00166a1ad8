use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use rayon::prelude::*;
use tracing::{debug, warn};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Rasterizes PDF pages with `pdftoppm` and recognizes them with `tesseract`.
///
/// Both tools run as child processes; pages are recognized in parallel and
/// their text concatenated in page order. A run that outlives `timeout` has
/// its remaining children killed and its scratch directory removed.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    pub pdftoppm_bin: String,
    pub tesseract_bin: String,
    pub languages: String,
    pub dpi: u32,
    pub timeout: Duration,
}

impl TesseractOcr {
    pub fn from_config(config: &Config) -> Self {
        TesseractOcr {
            pdftoppm_bin: config.pdftoppm_bin.clone(),
            tesseract_bin: config.tesseract_bin.clone(),
            languages: config.ocr_languages.clone(),
            dpi: config.ocr_dpi,
            timeout: config.extraction_timeout(),
        }
    }

    pub fn recognize_pdf(&self, bytes: &[u8]) -> Result<String> {
        let deadline = Instant::now() + self.timeout;
        let workdir = tempfile::tempdir()?;
        let pdf_path = workdir.path().join("input.pdf");
        fs::write(&pdf_path, bytes)?;

        let prefix = workdir.path().join("page");
        let mut rasterize = Command::new(&self.pdftoppm_bin);
        rasterize
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg(&pdf_path)
            .arg(&prefix);
        run_until(&self.pdftoppm_bin, rasterize, &workdir.path().join("pdftoppm.log"), deadline)?;

        let pages = page_images(workdir.path())?;
        if pages.is_empty() {
            return Err(Error::extraction("rasterization produced no page images"));
        }
        debug!(pages = pages.len(), "running OCR on rasterized pages");

        let texts = pages.par_iter()
            .map(|page| self.recognize_page(page, deadline))
            .collect::<Result<Vec<String>>>()?;

        Ok(texts.concat())
    }

    pub fn recognize_image(&self, image: &Path) -> Result<String> {
        self.recognize_page(image, Instant::now() + self.timeout)
    }

    // tesseract writes `<base>.txt` next to the image
    fn recognize_page(&self, image: &Path, deadline: Instant) -> Result<String> {
        if Instant::now() >= deadline {
            return Err(timed_out(&self.tesseract_bin));
        }

        let base = image.with_extension("");
        let mut recognize = Command::new(&self.tesseract_bin);
        recognize
            .arg(image)
            .arg(&base)
            .arg("-l")
            .arg(&self.languages);
        run_until(&self.tesseract_bin, recognize, &base.with_extension("log"), deadline)?;

        let text = fs::read(base.with_extension("txt"))
            .map_err(|e| Error::extraction(format!("'{}' left no output: {}", self.tesseract_bin, e)))?;
        let text = String::from_utf8_lossy(&text).into_owned();
        debug!(page = %image.display(), chars = text.len(), "page recognized");
        Ok(text)
    }
}

/// Runs `command` with stdout and stderr sent to `log`, killing it at `deadline`.
fn run_until(program: &str, mut command: Command, log: &Path, deadline: Instant) -> Result<()> {
    let log_file = File::create(log)?;
    let mut child = command
        .stdin(Stdio::null())
        .stdout(log_file.try_clone()?)
        .stderr(log_file)
        .spawn()
        .map_err(|e| Error::extraction(format!("could not run '{}': {}", program, e)))?;

    let status: ExitStatus = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            if let Err(e) = child.kill() {
                warn!(program, error = %e, "could not kill OCR tool after timeout");
            }
            let _ = child.wait();
            return Err(timed_out(program));
        }
        thread::sleep(POLL_INTERVAL);
    };

    if !status.success() {
        let output = fs::read(log).unwrap_or_default();
        return Err(Error::extraction(format!(
            "'{}' exited with {}: {}",
            program,
            status,
            String::from_utf8_lossy(&output).trim()
        )));
    }
    Ok(())
}

fn timed_out(program: &str) -> Error {
    Error::new(ErrorKind::Timeout, format!("'{}' did not finish before the extraction deadline", program))
}

/// `page-1.png`, `page-02.png`, ... sorted by page number.
fn page_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<(u32, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("png") {
            continue;
        }
        let number = path.file_stem()
            .and_then(|s| s.to_str())
            .and_then(|stem| stem.rsplit('-').next())
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(number) = number {
            pages.push((number, path));
        }
    }
    pages.sort_by_key(|(number, _)| *number);
    Ok(pages.into_iter().map(|(_, path)| path).collect())
}
