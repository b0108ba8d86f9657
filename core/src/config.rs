//! Resource limits for a runtime
//!
//! All limits are fixed when the runtime is created. There is no growth:
//! running out of heap cells or symbol ids is fatal.

/// Default number of cells in the heap.
pub const DEFAULT_HEAP_CELLS: usize = 64 * 1024;

/// Default maximum number of distinct symbols.
pub const DEFAULT_MAX_SYMBOLS: usize = 4096;

/// Default maximum symbol token length, in characters.
pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 32;

/// Limits applied to a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Capacity of the cell store.
    pub heap_cells: usize,
    /// Upper bound on interned symbols.
    pub max_symbols: usize,
    /// Symbol tokens longer than this are truncated by the reader.
    pub max_token_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            heap_cells: DEFAULT_HEAP_CELLS,
            max_symbols: DEFAULT_MAX_SYMBOLS,
            max_token_length: DEFAULT_MAX_TOKEN_LENGTH,
        }
    }
}

impl Config {
    pub fn with_heap_cells(mut self, cells: usize) -> Self {
        self.heap_cells = cells;
        self
    }

    pub fn with_max_symbols(mut self, count: usize) -> Self {
        self.max_symbols = count;
        self
    }

    pub fn with_max_token_length(mut self, length: usize) -> Self {
        self.max_token_length = length.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.heap_cells, DEFAULT_HEAP_CELLS);
        assert_eq!(config.max_symbols, DEFAULT_MAX_SYMBOLS);
        assert_eq!(config.max_token_length, DEFAULT_MAX_TOKEN_LENGTH);
    }

    #[test]
    fn test_builder() {
        let config = Config::default()
            .with_heap_cells(512)
            .with_max_symbols(64)
            .with_max_token_length(0);
        assert_eq!(config.heap_cells, 512);
        assert_eq!(config.max_symbols, 64);
        // A zero-length token bound would make every symbol empty
        assert_eq!(config.max_token_length, 1);
    }
}
