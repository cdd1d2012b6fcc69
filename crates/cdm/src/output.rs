use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

const BAR_WIDTH: usize = 50;

/// Set while a progress line is waiting for its newline
static PROGRESS_LINE_OPEN: AtomicBool = AtomicBool::new(false);

pub fn print_json(s: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{s}")
}

pub fn print_text(s: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    finish_progress_line(&mut out)?;
    writeln!(out, "{s}")
}

/// Redraws the progress line in place
pub fn print_progress(downloaded: u64, total: u64) -> io::Result<()> {
    let mut out = io::stdout().lock();

    write!(out, "\r{}", render_progress(downloaded, total))?;
    PROGRESS_LINE_OPEN.store(true, Ordering::Relaxed);

    if total > 0 && downloaded >= total {
        finish_progress_line(&mut out)?;
    }
    out.flush()
}

/// `[#####     ]  42%`, or a byte count when the length is unknown
fn render_progress(downloaded: u64, total: u64) -> String {
    if total == 0 {
        return format!("{} bytes", downloaded);
    }

    let ratio = (downloaded as f64 / total as f64).min(1.0);
    let filled = (ratio * BAR_WIDTH as f64) as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        (ratio * 100.0) as u8
    )
}

fn finish_progress_line(out: &mut impl Write) -> io::Result<()> {
    if PROGRESS_LINE_OPEN.swap(false, Ordering::Relaxed) {
        writeln!(out)?;
    }
    Ok(())
}
