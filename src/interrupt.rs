use log::{info, warn};
use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Conventional status for a process ended by SIGINT.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Shared stop request, checked once per loop iteration.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Raises `flag` on the first Ctrl-C instead of killing the process, so the
/// loop can release the camera and close the window on its way out. A second
/// Ctrl-C exits immediately, for when the loop is stuck in a blocking read.
pub fn install_ctrl_c(flag: StopFlag) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    thread::Builder::new()
        .name("ctrl-c".to_owned())
        .spawn(move || {
            runtime.block_on(watch_interrupts(tokio::signal::ctrl_c, flag, || {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }))
        })?;
    Ok(())
}

async fn watch_interrupts<S, F>(mut next_signal: S, flag: StopFlag, force_exit: impl FnOnce())
where
    S: FnMut() -> F,
    F: Future<Output = io::Result<()>>,
{
    if let Err(err) = next_signal().await {
        warn!("Failed to listen for Ctrl-C {:?}", err);
        return;
    }
    info!("Interrupt received, shutting down");
    flag.raise();

    if next_signal().await.is_ok() {
        warn!("Second interrupt, exiting without cleanup");
        force_exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::future;

    #[test]
    fn test_clones_share_state() {
        let flag = StopFlag::default();
        let handle = flag.clone();
        assert!(!flag.is_raised());
        handle.raise();
        assert!(flag.is_raised());
    }

    fn signals(script: Vec<bool>) -> impl FnMut() -> future::Ready<io::Result<()>> {
        let mut script = script.into_iter();
        move || {
            future::ready(match script.next() {
                Some(true) => Ok(()),
                _ => Err(io::Error::new(io::ErrorKind::Other, "no signal")),
            })
        }
    }

    #[tokio::test]
    async fn test_first_interrupt_raises_flag() {
        let flag = StopFlag::default();
        let exited = Cell::new(false);
        watch_interrupts(signals(vec![true, false]), flag.clone(), || exited.set(true)).await;
        assert!(flag.is_raised());
        assert!(!exited.get());
    }

    #[tokio::test]
    async fn test_second_interrupt_forces_exit() {
        let flag = StopFlag::default();
        let exited = Cell::new(false);
        watch_interrupts(signals(vec![true, true]), flag.clone(), || exited.set(true)).await;
        assert!(flag.is_raised());
        assert!(exited.get());
    }

    #[tokio::test]
    async fn test_listener_failure_leaves_flag_down() {
        let flag = StopFlag::default();
        let exited = Cell::new(false);
        watch_interrupts(signals(vec![false]), flag.clone(), || exited.set(true)).await;
        assert!(!flag.is_raised());
        assert!(!exited.get());
    }

    #[test]
    fn test_raise_from_other_thread() {
        let flag = StopFlag::default();
        let handle = flag.clone();
        thread::spawn(move || handle.raise()).join().unwrap();
        assert!(flag.is_raised());
    }
}
