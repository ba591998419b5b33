//! Tick source abstraction for platform-agnostic periodic interrupts.
//!
//! The `TickSource` trait is the only hardware seam of the crate: it starts a
//! periodic interrupt whose handler calls [`SoftTimer::tick`](crate::SoftTimer::tick).

/// Platform-agnostic periodic tick trait.
///
/// Implementations configure one hardware timer (SysTick, a TC/TIM peripheral,
/// a host thread) to interrupt every `period_us` microseconds. The interrupt
/// handler must call `SoftTimer::tick()` once per period.
///
/// Ticks must not be queued: if a tick is still being dispatched when the
/// next one is due, the next one is dropped. Hardware interrupts behave this
/// way naturally since a pending flag cannot count.
pub trait TickSource {
    /// Platform-specific error type
    type Error;

    /// Configure and start periodic tick delivery.
    ///
    /// Called exactly once, by [`SoftTimer::init`](crate::SoftTimer::init).
    fn start(&mut self, period_us: u32) -> Result<(), Self::Error>;
}

/// Reload value for a timer clocked at `clock_hz` to overflow every `period_us`.
///
/// This is the value to program into a down-counter reload register or a
/// match-and-clear period register, i.e. the period in clock cycles minus one.
/// Returns `None` when the period is shorter than one clock cycle or does not
/// fit in 32 bits.
pub const fn reload_for(clock_hz: u32, period_us: u32) -> Option<u32> {
    let cycles = clock_hz as u64 * period_us as u64 / 1_000_000;
    if cycles == 0 || cycles - 1 > u32::MAX as u64 {
        return None;
    }
    Some((cycles - 1) as u32)
}

#[cfg(feature = "cortex-m")]
pub use systick::{SysTickError, SysTickSource};

#[cfg(feature = "cortex-m")]
mod systick {
    use super::{TickSource, reload_for};
    use cortex_m::peripheral::SYST;
    use cortex_m::peripheral::syst::SystClkSource;

    /// SysTick reload register width is 24 bits.
    const MAX_RELOAD: u32 = 0x00FF_FFFF;

    /// SysTick configuration error.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum SysTickError {
        /// Requested period does not fit the 24-bit reload register
        ReloadOutOfRange,
    }

    /// Cortex-M SysTick tick source clocked from the core clock.
    ///
    /// The application provides the exception handler:
    ///
    /// ```ignore
    /// #[cortex_m_rt::exception]
    /// fn SysTick() {
    ///     TIMER.tick();
    /// }
    /// ```
    pub struct SysTickSource {
        syst: SYST,
        core_hz: u32,
    }

    impl SysTickSource {
        /// Wrap the SysTick peripheral. `core_hz` is the processor clock.
        pub fn new(syst: SYST, core_hz: u32) -> Self {
            Self { syst, core_hz }
        }

        /// Stop the counter and give the peripheral back.
        pub fn free(mut self) -> SYST {
            self.syst.disable_interrupt();
            self.syst.disable_counter();
            self.syst
        }
    }

    impl core::fmt::Debug for SysTickSource {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            f.debug_struct("SysTickSource")
                .field("core_hz", &self.core_hz)
                .finish_non_exhaustive()
        }
    }

    impl TickSource for SysTickSource {
        type Error = SysTickError;

        fn start(&mut self, period_us: u32) -> Result<(), Self::Error> {
            let reload = match reload_for(self.core_hz, period_us) {
                Some(reload) if reload <= MAX_RELOAD => reload,
                _ => return Err(SysTickError::ReloadOutOfRange),
            };

            self.syst.set_clock_source(SystClkSource::Core);
            self.syst.set_reload(reload);
            self.syst.clear_current();
            self.syst.enable_interrupt();
            self.syst.enable_counter();
            Ok(())
        }
    }
}
