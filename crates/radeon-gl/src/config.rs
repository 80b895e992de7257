//! # Driver Configuration
//!
//! Per-context tunables: command buffer and DMA pool sizing, memory limits
//! for the working-set check, and driconf-style options.

use radeon_cmd::CmdBufConfig;
use radeon_cmd::regs::spi;
use radeon_core::ChipFamily;
use radeon_mem::{DmaConfig, MemoryLimits};

/// Configuration of one rendering context
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Chip generation
    pub chip: ChipFamily,
    /// Command buffer sizing
    pub cmdbuf: CmdBufConfig,
    /// DMA pool sizing
    pub dma: DmaConfig,
    /// Memory available to one command buffer
    pub limits: MemoryLimits,
    /// Draw smooth lines and points aliased instead of falling back
    pub low_impact_fallback: bool,
    /// Interpolators available to fragment inputs
    pub interpolator_slots: usize,
    /// Texture units exposed to GL
    pub max_texture_units: usize,
}

impl DriverConfig {
    /// Defaults for `chip`
    pub fn for_chip(chip: ChipFamily) -> Self {
        Self {
            chip,
            cmdbuf: CmdBufConfig::default(),
            dma: DmaConfig::default(),
            limits: MemoryLimits::default(),
            low_impact_fallback: false,
            interpolator_slots: spi::MAX_PS_INPUTS,
            max_texture_units: chip.max_texture_units(),
        }
    }

    /// Set the low-impact fallback option
    pub fn with_low_impact_fallback(mut self, on: bool) -> Self {
        self.low_impact_fallback = on;
        self
    }

    /// Use a command buffer of `dwords`
    pub fn with_cmdbuf_capacity(mut self, dwords: u32) -> Self {
        self.cmdbuf.capacity_dwords = dwords;
        self
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::for_chip(ChipFamily::R700)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_defaults() {
        let config = DriverConfig::for_chip(ChipFamily::Evergreen);
        assert_eq!(config.max_texture_units, 18);
        assert_eq!(config.interpolator_slots, 32);
        assert!(!config.low_impact_fallback);
        assert_eq!(DriverConfig::default().chip, ChipFamily::R700);
    }

    #[test]
    fn test_builders() {
        let config = DriverConfig::for_chip(ChipFamily::R600)
            .with_low_impact_fallback(true)
            .with_cmdbuf_capacity(512);
        assert!(config.low_impact_fallback);
        assert_eq!(config.cmdbuf.capacity_dwords, 512);
    }
}
