//! Once-only process termination on FATAL messages
//!
//! The first FATAL message to finish delivery claims the coordinator and,
//! under [`FatalPolicy::Exit`], terminates the process. Every later FATAL
//! message, including one raised while the first is still being handled,
//! finds the coordinator claimed and returns normally.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Exit status used when a FATAL message terminates the process
pub const FATAL_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalPolicy {
    /// Terminate with [`FATAL_EXIT_CODE`]
    Exit,
    /// Keep running; used by test harnesses and non-aborting builds
    NoExit,
}

impl FatalPolicy {
    /// Policy selected by the `fatal-noexit` / `fatal-noexit-debug` features
    pub const DEFAULT: FatalPolicy = if cfg!(feature = "fatal-noexit")
        || (cfg!(feature = "fatal-noexit-debug") && cfg!(debug_assertions))
    {
        FatalPolicy::NoExit
    } else {
        FatalPolicy::Exit
    };
}

impl Default for FatalPolicy {
    fn default() -> Self {
        FatalPolicy::DEFAULT
    }
}

static GLOBAL: FatalCoordinator = FatalCoordinator::new(FatalPolicy::DEFAULT);

#[derive(Debug)]
pub struct FatalCoordinator {
    claimed: AtomicBool,
    exit_enabled: AtomicBool,
    terminations: AtomicUsize,
}

impl FatalCoordinator {
    pub const fn new(policy: FatalPolicy) -> Self {
        Self {
            claimed: AtomicBool::new(false),
            exit_enabled: AtomicBool::new(matches!(policy, FatalPolicy::Exit)),
            terminations: AtomicUsize::new(0),
        }
    }

    /// The process-wide coordinator used by scopes that were not given one
    pub fn global() -> &'static FatalCoordinator {
        &GLOBAL
    }

    /// Atomically claim the coordinator; `true` for the first caller only
    #[inline]
    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    pub fn policy(&self) -> FatalPolicy {
        if self.exit_enabled.load(Ordering::Acquire) {
            FatalPolicy::Exit
        } else {
            FatalPolicy::NoExit
        }
    }

    pub fn set_policy(&self, policy: FatalPolicy) {
        self.exit_enabled
            .store(matches!(policy, FatalPolicy::Exit), Ordering::Release);
    }

    /// Number of times termination was armed (at most one per coordinator)
    pub fn termination_attempts(&self) -> usize {
        self.terminations.load(Ordering::Acquire)
    }

    /// Claim and, if this call won, apply the policy.
    ///
    /// Returns `true` when this call armed termination. Under
    /// [`FatalPolicy::Exit`] the winning call does not return.
    pub fn trigger(&self) -> bool {
        self.trigger_with(|| {})
    }

    /// Like [`trigger`](Self::trigger), running `before_exit` right before
    /// the process is terminated (not at all under `NoExit`)
    pub fn trigger_with<F: FnOnce()>(&self, before_exit: F) -> bool {
        if !self.try_claim() {
            return false;
        }
        self.terminations.fetch_add(1, Ordering::AcqRel);
        if self.policy() == FatalPolicy::Exit {
            before_exit();
            std::process::exit(FATAL_EXIT_CODE);
        }
        true
    }
}

impl Default for FatalCoordinator {
    fn default() -> Self {
        Self::new(FatalPolicy::DEFAULT)
    }
}
