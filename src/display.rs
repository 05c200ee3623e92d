//! Named display slots and their terminal rendering.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use meteoclock_clock::DisplaySink;
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Time,
    Date,
    LocationName,
    /// Why the fallback location is shown; untouched by weather errors
    LocationNotice,
    Icon,
    Temperature,
    Description,
    Wind,
    Forecast,
}

/// Shared slot contents. Cloning shares the same board.
#[derive(Debug, Clone, Default)]
pub struct SlotBoard {
    slots: Arc<Mutex<BTreeMap<Slot, String>>>,
}

impl SlotBoard {
    pub fn set(&self, slot: Slot, text: impl Into<String>) {
        self.slots.lock().insert(slot, text.into());
    }

    pub fn get(&self, slot: Slot) -> Option<String> {
        self.slots.lock().get(&slot).cloned()
    }

    pub fn clear(&self, slot: Slot) {
        self.slots.lock().remove(&slot);
    }

    /// Non-empty slots in display order, separated by two spaces.
    pub fn render_line(&self) -> String {
        self.slots
            .lock()
            .values()
            .filter(|text| !text.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// Clock sink writing into the board, optionally redrawing the terminal line.
pub struct BoardSink {
    board: SlotBoard,
    redraw: bool,
}

impl BoardSink {
    pub fn new(board: SlotBoard, redraw: bool) -> Self {
        Self { board, redraw }
    }

    fn draw(&self) {
        let mut stdout = std::io::stdout().lock();
        // carriage return + erase line, then the whole board
        let _ = write!(stdout, "\r\x1b[2K{}", self.board.render_line());
        let _ = stdout.flush();
    }
}

impl DisplaySink for BoardSink {
    fn show_time(&mut self, time: &str) {
        self.board.set(Slot::Time, time);
    }

    fn show_date(&mut self, date: &str) {
        self.board.set(Slot::Date, date);
        // date is written last on every render
        if self.redraw {
            self.draw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_line_follows_slot_order() {
        let board = SlotBoard::default();
        board.set(Slot::Temperature, "+15°C");
        board.set(Slot::Time, "03:04:05");
        board.set(Slot::LocationName, "Madrid");

        assert_eq!(board.render_line(), "03:04:05  Madrid  +15°C");
    }

    #[test]
    fn test_render_line_skips_empty_slots() {
        let board = SlotBoard::default();
        board.set(Slot::Time, "03:04:05");
        board.set(Slot::Icon, "");
        board.set(Slot::Wind, "Viento: ↗11km/h");

        assert_eq!(board.render_line(), "03:04:05  Viento: ↗11km/h");
    }

    #[test]
    fn test_clear_removes_slot() {
        let board = SlotBoard::default();
        board.set(Slot::Forecast, "x");
        board.clear(Slot::Forecast);
        assert!(board.get(Slot::Forecast).is_none());
    }

    #[test]
    fn test_sink_writes_time_and_date_slots() {
        let board = SlotBoard::default();
        let mut sink = BoardSink::new(board.clone(), false);

        sink.show_time("03:04:05");
        sink.show_date("Viernes, 8 de noviembre de 2024");

        assert_eq!(board.get(Slot::Time).as_deref(), Some("03:04:05"));
        assert_eq!(
            board.get(Slot::Date).as_deref(),
            Some("Viernes, 8 de noviembre de 2024")
        );
    }
}
