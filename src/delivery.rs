//! Delivery collaborator seam.
//!
//! The summary goes out first, then each attachment in order, with a fixed
//! pause between successive sends. A failed attachment is logged and counted;
//! a failed summary aborts the delivery.

use std::{
    io::Write,
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use log::{info, warn};

pub trait Delivery {
    fn send_text(&mut self, to: &str, text: &str) -> Result<()>;
    fn send_attachment(&mut self, to: &str, path: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attachments_sent: usize,
    pub failed: Vec<PathBuf>,
}

pub fn deliver(
    delivery: &mut dyn Delivery,
    to: &str,
    text: &str,
    attachments: &[PathBuf],
    pacing: Duration,
) -> Result<DeliveryReport> {
    delivery
        .send_text(to, text)
        .with_context(|| format!("Sending summary to {to}"))?;
    let mut report = DeliveryReport::default();
    for path in attachments {
        if !pacing.is_zero() {
            thread::sleep(pacing);
        }
        match delivery.send_attachment(to, path) {
            Ok(()) => report.attachments_sent += 1,
            Err(err) => {
                warn!("Failed to send {path:?}: {err:#}");
                report.failed.push(path.clone());
            }
        }
    }
    info!(
        "Delivered summary and {}/{} attachment(s) to {to}",
        report.attachments_sent,
        attachments.len()
    );
    Ok(report)
}

/// Writes a transcript of every send to `W`.
pub struct ConsoleDelivery<W: Write> {
    out: W,
}

impl<W: Write> ConsoleDelivery<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Delivery for ConsoleDelivery<W> {
    fn send_text(&mut self, to: &str, text: &str) -> Result<()> {
        writeln!(self.out, "--- to {to} ---")?;
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    fn send_attachment(&mut self, to: &str, path: &Path) -> Result<()> {
        if !path.exists() {
            anyhow::bail!("attachment {path:?} does not exist");
        }
        writeln!(self.out, "--- to {to}: attachment {} ---", path.display())?;
        Ok(())
    }
}
