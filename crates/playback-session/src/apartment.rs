//! Single-threaded execution context for thread-affine engine calls.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};

use crossbeam_channel::{bounded, unbounded, Sender};

type Job = Box<dyn FnOnce() + Send>;

/// A dedicated worker thread that runs submitted closures one at a time.
///
/// Render-target mutation is only safe from the engine's apartment; calls
/// that originate elsewhere (a UI resize, a compositor frame request) are
/// marshalled through [`Apartment::run`], which blocks until the closure has
/// finished on the worker. Closures from all sessions sharing an apartment
/// queue; they never run concurrently.
///
/// Submitting from the worker thread itself short-circuits to direct
/// execution, so a closure may call back into its own apartment without
/// deadlocking.
pub struct Apartment {
    tx: Sender<Job>,
    worker: ThreadId,
}

impl Apartment {
    pub fn new(name: &str) -> Self {
        let (tx, rx) = unbounded::<Job>();
        let (id_tx, id_rx) = bounded(1);
        thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let _ = id_tx.send(thread::current().id());
                for job in rx {
                    job();
                }
            })
            .expect("spawn apartment worker");
        let worker = id_rx.recv().expect("apartment worker id");
        Self { tx, worker }
    }

    /// The process-wide apartment shared by all playback sessions.
    pub fn shared() -> Arc<Apartment> {
        static SHARED: OnceLock<Arc<Apartment>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(Apartment::new("engine-apartment")))
            .clone()
    }

    /// Run `f` on the apartment thread and block until it completes,
    /// returning its result. A panic inside `f` resurfaces on the calling
    /// thread.
    pub fn run<R, F>(&self, f: F) -> R
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        if thread::current().id() == self.worker {
            return f();
        }
        let (done_tx, done_rx) = bounded(1);
        let job: Job = Box::new(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(f));
            let _ = done_tx.send(result);
        });
        self.tx.send(job).expect("apartment worker is gone");
        match done_rx.recv().expect("apartment worker dropped result") {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn runs_on_the_worker_thread_and_returns_the_result() {
        let apartment = Apartment::new("apartment-test");
        let caller = thread::current().id();
        let (worker, answer) = apartment.run(move || (thread::current().id(), 41 + 1));
        assert_ne!(worker, caller);
        assert_eq!(answer, 42);
    }

    #[test]
    fn closures_never_run_concurrently() {
        let apartment = Arc::new(Apartment::new("apartment-serial"));
        let current = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let apartment = apartment.clone();
            let current = current.clone();
            let max_seen = max_seen.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..4 {
                    apartment.run({
                        let current = current.clone();
                        let max_seen = max_seen.clone();
                        move || {
                            let inside = current.fetch_add(1, Ordering::SeqCst) + 1;
                            max_seen.fetch_max(inside, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(1));
                            current.fetch_sub(1, Ordering::SeqCst);
                        }
                    });
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reentrant_submission_executes_directly() {
        let apartment = Arc::new(Apartment::new("apartment-reentrant"));
        let inner = apartment.clone();
        let value = apartment.run(move || inner.run(|| 7));
        assert_eq!(value, 7);
    }

    #[test]
    fn panics_resurface_on_the_caller() {
        let apartment = Apartment::new("apartment-panic");
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            apartment.run(|| panic!("engine exploded"));
        }));
        assert!(result.is_err());
        // The worker survives the panic and keeps serving.
        assert_eq!(apartment.run(|| 3), 3);
    }
}
