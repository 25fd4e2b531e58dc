//! Once-only OCR engine initialization.

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::OcrError;

/// Holds an OCR engine that is built on first use and shared afterwards.
///
/// Loading detection and recognition models is the slowest step of a scan,
/// so callers keep one `EngineCell` for the life of the process.
pub struct EngineCell<R> {
    cell: OnceCell<R>,
}

impl<R> EngineCell<R> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the engine, building it with `init` if this is the first call.
    ///
    /// A failed `init` leaves the cell empty so a later call may retry.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<&R, OcrError>
    where
        F: FnOnce() -> Result<R, OcrError>,
    {
        self.cell.get_or_try_init(|| {
            debug!("Initializing OCR engine");
            init()
        })
    }

    /// The engine, if already built.
    pub fn get(&self) -> Option<&R> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<R> Default for EngineCell<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_initializes_once_across_threads() {
        let cell: EngineCell<String> = EngineCell::new();
        let inits = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let engine = cell
                        .get_or_try_init(|| {
                            inits.fetch_add(1, Ordering::SeqCst);
                            Ok("engine".to_string())
                        })
                        .unwrap();
                    assert_eq!(engine, "engine");
                });
            }
        });

        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert!(cell.is_initialized());
    }

    #[test]
    fn test_failed_init_can_retry() {
        let cell: EngineCell<u32> = EngineCell::new();

        let first = cell.get_or_try_init(|| Err(OcrError::ModelLoad("missing det.onnx".to_string())));
        assert!(first.is_err());
        assert!(cell.get().is_none());

        assert_eq!(*cell.get_or_try_init(|| Ok(7)).unwrap(), 7);
        assert_eq!(cell.get(), Some(&7));
    }
}
