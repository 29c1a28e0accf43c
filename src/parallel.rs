use std::thread;
use std::sync::{ Mutex, PoisonError };
use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };

use log::{ error, info };

use crate::error::{ Result, TracerError };

/// A pixel of the image, by column and row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pixel {
    pub col: usize,
    pub row: usize,
}

/// Hands out the pixels of an image to render workers.
///
/// Every pixel is handed out exactly once, in row-major order. Claiming is a
/// single atomic increment, so workers share the manager by reference.
#[derive(Debug)]
pub struct PixelManager {
    width: usize,
    total: usize,
    next: AtomicUsize,
    done: AtomicUsize,
    cancelled: AtomicBool,

    /// Number of finished pixels between two progress reports.
    report_every: usize,
}

impl PixelManager {
    /// Creates a manager for a `width` by `height` image, reporting progress
    /// every `interval_percent` percent. An interval of 0 disables reports.
    pub fn new(width: usize, height: usize, interval_percent: usize) -> PixelManager {
        let total = width * height;
        let report_every = if interval_percent == 0 {
            0
        } else {
            (total * interval_percent / 100).max(1)
        };

        PixelManager {
            width,
            total,
            next: AtomicUsize::new(0),
            done: AtomicUsize::new(0),
            cancelled: AtomicBool::new(false),
            report_every,
        }
    }

    /// Claims the next unclaimed pixel, or `None` when every pixel has been
    /// claimed or the render was cancelled.
    pub fn next_pixel(&self) -> Option<Pixel> {
        if self.cancelled.load(Ordering::Acquire) {
            return None;
        }

        let i = self.next.fetch_add(1, Ordering::Relaxed);
        if i >= self.total {
            return None;
        }

        Some(Pixel { col: i % self.width, row: i / self.width })
    }

    /// Records a finished pixel.
    pub fn pixel_done(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if self.report_every > 0 && (done % self.report_every == 0 || done == self.total) {
            info!("rendered {}% ({}/{} pixels)", done * 100 / self.total, done, self.total);
        }
    }

    /// Stops handing out pixels. Pixels already claimed are still finished.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn pixels_done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Runs `work` on every pixel handed out by `manager`.
///
/// With `threads == 0` the pixels are processed on the calling thread.
/// Otherwise `threads` workers claim pixels until none are left. The first
/// failing pixel cancels the manager; the remaining workers finish the pixel
/// they hold and stop, and the first error is returned as `RenderFailed` once
/// every worker has been joined. Panics are not caught: a panicking worker
/// makes the whole call panic after the join.
pub fn for_each_pixel<F>(manager: &PixelManager, threads: usize, work: F) -> Result<()>
where
    F: Fn(Pixel) -> Result<()> + Sync,
{
    if threads == 0 {
        while let Some(pixel) = manager.next_pixel() {
            if let Err(e) = work(pixel) {
                error!("pixel ({}, {}) failed: {}", pixel.col, pixel.row, e);
                manager.cancel();
                return Err(TracerError::RenderFailed(e.to_string()));
            }

            manager.pixel_done();
        }

        return Ok(());
    }

    let first_error: Mutex<Option<TracerError>> = Mutex::new(None);

    thread::scope(|s| {
        for id in 0..threads {
            let work = &work;
            let first_error = &first_error;

            s.spawn(move || {
                while let Some(pixel) = manager.next_pixel() {
                    if let Err(e) = work(pixel) {
                        error!(
                            "worker {} failed on pixel ({}, {}): {}",
                            id, pixel.col, pixel.row, e
                        );
                        manager.cancel();

                        if let Ok(mut slot) = first_error.lock() {
                            slot.get_or_insert(e);
                        }
                        break;
                    }

                    manager.pixel_done();
                }
            });
        }
    });

    // The lock is only held to store the error, so it is never poisoned.
    match first_error.into_inner().unwrap_or_else(PoisonError::into_inner) {
        None => Ok(()),
        Some(e) => Err(TracerError::RenderFailed(e.to_string())),
    }
}

#[test]
fn pixels_are_handed_out_row_major() {
    let manager = PixelManager::new(3, 2, 0);
    let mut pixels = Vec::new();
    while let Some(p) = manager.next_pixel() {
        pixels.push((p.col, p.row));
    }

    assert_eq!(pixels, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
    assert_eq!(manager.next_pixel(), None);
}

#[test]
fn cancelled_manager_stops() {
    let manager = PixelManager::new(4, 4, 10);
    assert!(manager.next_pixel().is_some());

    manager.cancel();
    assert!(manager.is_cancelled());
    assert_eq!(manager.next_pixel(), None);
}

#[test]
fn every_pixel_claimed_once() {
    let manager = PixelManager::new(17, 13, 10);
    let seen = Mutex::new(vec![0usize; 17 * 13]);

    for_each_pixel(&manager, 4, |p| {
        seen.lock().unwrap()[p.row * 17 + p.col] += 1;
        Ok(())
    }).unwrap();

    assert!(seen.into_inner().unwrap().iter().all(|n| *n == 1));
    assert_eq!(manager.pixels_done(), manager.total());
}

#[test]
fn worker_failure_aborts_render() {
    for threads in [0, 3] {
        let manager = PixelManager::new(10, 10, 0);
        let result = for_each_pixel(&manager, threads, |p| {
            if p.row == 2 && p.col == 5 {
                Err(TracerError::InvalidGeometry("boom".into()))
            } else {
                Ok(())
            }
        });

        match result {
            Err(TracerError::RenderFailed(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected a failed render, got {:?}", other),
        }
        assert!(manager.is_cancelled());
        assert!(manager.pixels_done() < 100);
    }
}

#[test]
#[should_panic]
fn worker_panic_is_not_swallowed() {
    let manager = PixelManager::new(4, 4, 0);

    let _ = for_each_pixel(&manager, 2, |pixel| {
        if pixel.row == 2 {
            panic!("shader bug");
        }
        Ok(())
    });
}
