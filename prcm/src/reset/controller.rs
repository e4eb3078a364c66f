use super::{RegisterDescriptor, ResetRegistry, xlate};
use crate::{
    ResetError,
    config::RESET_N_CELLS,
    dev::{
        handle::Handle,
        mmio::{IoWindow, RegisterIo},
    },
};
use alloc::boxed::Box;
use dt::{DeviceTree, PhandleArgs};
use log::error;
use utils::num::bit32;

/// Translates a consumer's phandle reference into a reset id.
pub type XlateFn = fn(&ResetController, &DeviceTree, &PhandleArgs) -> Result<u32, ResetError>;

/// Reset controller for the lines of one PRCM instance.
///
/// Owns the registry built by discovery and the register window all of
/// its lines live in. Dropping the controller unmaps the window. A
/// controller without lines has no window.
pub struct ResetController {
    name: Box<str>,
    registry: ResetRegistry,
    window: Option<Handle<IoWindow>>,
    /// Number of reset lines reported to the framework.
    pub nr_resets: usize,
    /// Argument cells in a consumer reference.
    pub of_reset_n_cells: usize,
    /// Device-tree node consumers reference to reach this controller.
    pub of_node: usize,
    pub of_xlate: XlateFn,
}

impl ResetController {
    pub fn new(
        name: &str,
        of_node: usize,
        window: Option<Handle<IoWindow>>,
        registry: ResetRegistry,
    ) -> ResetController {
        ResetController {
            name: Box::from(name),
            nr_resets: registry.len(),
            registry,
            window,
            of_reset_n_cells: RESET_N_CELLS,
            of_node,
            of_xlate: xlate::child_phandle_xlate,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &ResetRegistry {
        &self.registry
    }

    pub fn window(&self) -> Option<&Handle<IoWindow>> {
        self.window.as_ref()
    }

    fn report<R>(&self, id: u32, op: &str, res: Result<R, ResetError>) -> Result<R, ResetError> {
        if let Err(err) = &res {
            error!("{}: cannot {} reset {:#x}: {}.", self.name, op, id, err);
        }
        res
    }

    /// Resolve `id` and run `f` on its registers with the window locked.
    fn modify(
        &self,
        id: u32,
        op: &str,
        f: impl FnOnce(&RegisterDescriptor, &dyn RegisterIo),
    ) -> Result<(), ResetError> {
        let res = self
            .registry
            .find(id)
            .and_then(|line| line.with_window(|window| window.locked(|io| f(line, io))));
        self.report(id, op, res)
    }

    /// Pulse the line. The bit is cleared and set again in the same value
    /// before a single write, so the line ends up asserted; completion is not
    /// waited for.
    pub fn reset(&self, id: u32) -> Result<(), ResetError> {
        self.modify(id, "reset", |line, io| {
            let reg = line.rstctrl_offs as usize;
            let bit = bit32(line.rstctrl_bit);
            let mut val = io.read32(reg);
            val &= !bit;
            val |= bit;
            io.write32(reg, val);
        })
    }

    /// Clear the status bit, then set the control bit if it is not set yet.
    pub fn assert(&self, id: u32) -> Result<(), ResetError> {
        self.modify(id, "assert", |line, io| {
            clear_status(line, io);
            let reg = line.rstctrl_offs as usize;
            let bit = bit32(line.rstctrl_bit);
            let val = io.read32(reg);
            if val & bit == 0 {
                io.write32(reg, val | bit);
            }
        })
    }

    /// Clear the status bit, then clear the control bit if it is set.
    pub fn deassert(&self, id: u32) -> Result<(), ResetError> {
        self.modify(id, "deassert", |line, io| {
            clear_status(line, io);
            let reg = line.rstctrl_offs as usize;
            let bit = bit32(line.rstctrl_bit);
            let val = io.read32(reg);
            if val & bit != 0 {
                io.write32(reg, val & !bit);
            }
        })
    }

    /// Whether the line's control bit is currently set.
    pub fn status(&self, id: u32) -> Result<bool, ResetError> {
        let res = self.registry.find(id).and_then(|line| {
            line.with_window(|window| {
                window.locked(|io| io.read32(line.rstctrl_offs as usize) & bit32(line.rstctrl_bit) != 0)
            })
        });
        self.report(id, "read status of", res)
    }
}

/// The status register is write-one-to-clear; other bits are left alone.
fn clear_status(line: &RegisterDescriptor, io: &dyn RegisterIo) {
    io.write32(line.rstst_offs as usize, bit32(line.rstst_bit));
}

impl core::fmt::Debug for ResetController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResetController")
            .field("name", &self.name)
            .field("window", &self.window)
            .field("nr_resets", &self.nr_resets)
            .field("lines", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dev::{
            handle::HandleRef,
            mmio::{IoMapper, sim::SimRegion},
        },
        logging::capture,
        reset::RegistryStage,
    };
    use alloc::sync::Arc;
    use core::{
        ops::Range,
        sync::atomic::{AtomicUsize, Ordering},
    };
    use std::{thread, time::Duration};

    const LINE_A: u32 = 0xa;
    const LINE_B: u32 = 0xb;

    fn line(window: &Handle<IoWindow>, id: u32, ctrl: (u32, u8), st: (u32, u8)) -> RegisterDescriptor {
        RegisterDescriptor {
            window: window.create_ref(),
            rstctrl_offs: ctrl.0,
            rstctrl_bit: ctrl.1,
            rstst_offs: st.0,
            rstst_bit: st.1,
            id,
            name: Box::from("rst"),
        }
    }

    /// Two lines sharing control register 0x10, mapped through `mapper`.
    fn controller_on(mapper: &dyn IoMapper) -> ResetController {
        let window = Handle::from(IoWindow::map(mapper, 0x4830_6000..0x4830_6100).unwrap());
        let mut stage = RegistryStage::new();
        stage.push(line(&window, LINE_A, (0x10, 2), (0x14, 2)));
        stage.push(line(&window, LINE_B, (0x10, 5), (0x14, 6)));
        let mut registry = ResetRegistry::new();
        registry.commit(stage).unwrap();
        ResetController::new("prm", 3, Some(window), registry)
    }

    fn controller() -> (ResetController, Arc<SimRegion>) {
        let region = Arc::new(SimRegion::new());
        region.write_one_to_clear(0x14);
        (controller_on(&region.mapper()), region)
    }

    /// Register file whose accesses each take a while and which counts how
    /// often two of them were in flight at once.
    struct SlowIo {
        region: SimRegion,
        in_flight: AtomicUsize,
        overlaps: AtomicUsize,
    }

    impl SlowIo {
        fn access<R>(&self, f: impl FnOnce(&SimRegion) -> R) -> R {
            if self.in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            thread::sleep(Duration::from_micros(50));
            let res = f(&self.region);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            res
        }
    }

    impl RegisterIo for SlowIo {
        fn read32(&self, offset: usize) -> u32 {
            self.access(|region| region.read32(offset))
        }
        fn write32(&self, offset: usize, value: u32) {
            self.access(|region| region.write32(offset, value))
        }
    }

    struct SlowMapper(Arc<SlowIo>);

    impl IoMapper for SlowMapper {
        fn map(&self, _range: Range<usize>) -> Result<Box<dyn RegisterIo>, ResetError> {
            Ok(Box::new(self.0.clone()))
        }
    }

    #[test]
    fn assert_then_deassert_scenario() {
        let (ctrl, region) = controller();
        ctrl.assert(LINE_A).unwrap();
        assert_eq!(region.writes_to(0x14), vec![0x0000_0004]);
        assert_eq!(region.peek(0x10), 0x0000_0004);

        region.clear_writes();
        region.poke(0x10, 0x0000_0004);
        ctrl.deassert(LINE_A).unwrap();
        assert_eq!(region.writes_to(0x14), vec![0x0000_0004]);
        assert_eq!(region.peek(0x10), 0x0000_0000);
    }

    #[test]
    fn assert_is_idempotent_with_one_status_write_per_call() {
        let (ctrl, region) = controller();
        region.poke(0x14, 0xff);
        ctrl.assert(LINE_B).unwrap();
        let once = region.peek(0x10);
        ctrl.assert(LINE_B).unwrap();
        assert_eq!(region.peek(0x10), once);
        assert_eq!(once, 1 << 5);
        assert_eq!(region.writes_to(0x14), vec![1 << 6, 1 << 6]);
        // Only the line's own status bit was cleared.
        assert_eq!(region.peek(0x14), 0xff & !(1 << 6));
        // The second call found the bit set and left the control register alone.
        assert_eq!(region.writes_to(0x10).len(), 1);
    }

    #[test]
    fn deassert_is_idempotent() {
        let (ctrl, region) = controller();
        region.poke(0x10, 0b10_0100);
        ctrl.deassert(LINE_B).unwrap();
        let once = region.peek(0x10);
        ctrl.deassert(LINE_B).unwrap();
        assert_eq!(region.peek(0x10), once);
        assert_eq!(once, 0b00_0100);
        assert_eq!(region.writes_to(0x10).len(), 1);
    }

    #[test]
    fn reset_always_leaves_bit_set() {
        let (ctrl, region) = controller();
        for initial in [0u32, 0x4, 0xffff_fffb, 0xffff_ffff] {
            region.poke(0x10, initial);
            ctrl.reset(LINE_A).unwrap();
            assert_eq!(region.peek(0x10), initial | 0x4);
        }
        assert!(region.writes_to(0x14).is_empty());
    }

    #[test]
    fn status_reports_control_bit() {
        let (ctrl, _region) = controller();
        assert_eq!(ctrl.status(LINE_A), Ok(false));
        ctrl.assert(LINE_A).unwrap();
        assert_eq!(ctrl.status(LINE_A), Ok(true));
        assert_eq!(ctrl.status(LINE_B), Ok(false));
    }

    #[test]
    fn unknown_id_fails_without_touching_registers() {
        let (ctrl, region) = controller();
        assert_eq!(ctrl.assert(0x99), Err(ResetError::NotFound { id: 0x99 }));
        assert_eq!(ctrl.deassert(0x99), Err(ResetError::NotFound { id: 0x99 }));
        assert_eq!(ctrl.reset(0x99), Err(ResetError::NotFound { id: 0x99 }));
        assert!(region.writes().is_empty());
    }

    #[test]
    fn torn_down_window_is_reported() {
        let region = Arc::new(SimRegion::new());
        let window = Handle::from(IoWindow::map(&region.mapper(), 0..0x100).unwrap());
        let mut stage = RegistryStage::new();
        let mut orphan = line(&window, LINE_A, (0x10, 2), (0x14, 2));
        orphan.window = HandleRef::dangling();
        stage.push(orphan);
        let mut registry = ResetRegistry::new();
        registry.commit(stage).unwrap();
        let ctrl = ResetController::new("prm", 3, Some(window), registry);
        assert_eq!(ctrl.assert(LINE_A), Err(ResetError::Detached));
        assert_eq!(ctrl.status(LINE_A), Err(ResetError::Detached));
        assert!(region.writes().is_empty());
    }

    #[test]
    fn failed_status_read_is_logged() {
        capture::install();
        let (ctrl, _region) = controller();
        assert_eq!(ctrl.status(0x98), Err(ResetError::NotFound { id: 0x98 }));
        assert!(capture::contains("prm: cannot read status of reset 0x98"));
    }

    #[test]
    fn concurrent_updates_on_shared_register_are_not_lost() {
        let io = Arc::new(SlowIo {
            region: SimRegion::new(),
            in_flight: AtomicUsize::new(0),
            overlaps: AtomicUsize::new(0),
        });
        io.region.write_one_to_clear(0x14);
        let ctrl = Arc::new(controller_on(&SlowMapper(io.clone())));
        let workers: Vec<_> = [LINE_A, LINE_B]
            .into_iter()
            .map(|id| {
                let ctrl = ctrl.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        ctrl.assert(id).unwrap();
                        assert!(ctrl.status(id).unwrap());
                        ctrl.deassert(id).unwrap();
                    }
                    ctrl.assert(id).unwrap();
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        // Every access, status reads included, runs under the window lock.
        assert_eq!(io.overlaps.load(Ordering::SeqCst), 0);
        assert_eq!(io.region.peek(0x10), (1 << 2) | (1 << 5));
    }
}
