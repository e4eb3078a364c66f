//! RAM-backed register region for host-side simulation of a PRCM block.
//!
//! Unwritten registers read as zero. Offsets marked with
//! [SimRegion::write_one_to_clear] behave like reset status registers: a
//! write clears the bits that are set in the written value. Every write is
//! recorded in order so callers can check the exact access sequence.
use super::{IoMapper, RegisterIo};
use crate::ResetError;
use alloc::{boxed::Box, collections::btree_map::BTreeMap, collections::btree_set::BTreeSet, sync::Arc, vec::Vec};
use core::ops::Range;
use spin::Mutex;

#[derive(Default)]
pub struct SimRegion {
    regs: Mutex<BTreeMap<usize, u32>>,
    w1c: Mutex<BTreeSet<usize>>,
    writes: Mutex<Vec<(usize, u32)>>,
}

impl SimRegion {
    pub fn new() -> SimRegion {
        SimRegion::default()
    }

    /// Make writes to `offset` clear the written bits instead of storing the value.
    pub fn write_one_to_clear(&self, offset: usize) {
        self.w1c.lock().insert(offset);
    }

    /// Set a register without recording a write, as the hardware would.
    pub fn poke(&self, offset: usize, value: u32) {
        self.regs.lock().insert(offset, value);
    }

    pub fn peek(&self, offset: usize) -> u32 {
        self.regs.lock().get(&offset).copied().unwrap_or(0)
    }

    /// Every write so far, oldest first.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.writes.lock().clone()
    }

    /// Values written to `offset`, oldest first.
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.writes
            .lock()
            .iter()
            .filter(|(off, _)| *off == offset)
            .map(|(_, value)| *value)
            .collect()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().clear();
    }

    /// A mapper handing out this region for every range.
    pub fn mapper(self: &Arc<Self>) -> SimMapper {
        SimMapper {
            region: self.clone(),
        }
    }
}

impl RegisterIo for SimRegion {
    fn read32(&self, offset: usize) -> u32 {
        self.peek(offset)
    }

    fn write32(&self, offset: usize, value: u32) {
        self.writes.lock().push((offset, value));
        let w1c = self.w1c.lock().contains(&offset);
        let mut regs = self.regs.lock();
        let reg = regs.entry(offset).or_insert(0);
        if w1c {
            *reg &= !value;
        } else {
            *reg = value;
        }
    }
}

pub struct SimMapper {
    region: Arc<SimRegion>,
}

impl IoMapper for SimMapper {
    fn map(&self, _range: Range<usize>) -> Result<Box<dyn RegisterIo>, ResetError> {
        Ok(Box::new(self.region.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_registers_clear_on_write_one() {
        let region = SimRegion::new();
        region.write_one_to_clear(0x14);
        region.poke(0x14, 0b1110);
        region.write32(0x14, 0b0100);
        assert_eq!(region.peek(0x14), 0b1010);
        region.write32(0x10, 0b0100);
        assert_eq!(region.peek(0x10), 0b0100);
        assert_eq!(region.writes(), vec![(0x14, 0b0100), (0x10, 0b0100)]);
        assert_eq!(region.writes_to(0x10), vec![0b0100]);
    }
}
