use bevy::prelude::*;
use queues::{IsQueue, Queue};
use thiserror::Error;
use tracing::debug;

use crate::GameState;
use crate::items::ItemCatalog;

pub const GRID_WIDTH: usize = 6;
pub const SLOT_COUNT: usize = 12;
pub const DEFAULT_SHUFFLE_AMOUNT: usize = 5;

const COMMAND_CAPACITY: usize = 32;

/// Index into the item catalog. The grid only ever stores ids; the catalog
/// owns the reference data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridCommand {
    Navigate(Direction),
    Select,
    Shuffle { amount: usize },
}

#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridEvent {
    CursorMoved { slot: usize },
    SlotChanged { slot: usize, item: Option<ItemId> },
    ItemPicked { slot: usize, item: ItemId },
    ItemPlaced { slot: usize, item: ItemId },
    Shuffled { filled: usize },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GridCommandError {
    #[error("command queue is full")]
    QueueFull,
}

/// Pending commands from the input layer, applied in push order once per
/// frame. Bounded so runaway input can never grow without limit.
#[derive(Resource)]
pub struct GridCommands {
    queue: Queue<GridCommand>,
}

impl Default for GridCommands {
    fn default() -> Self {
        Self {
            queue: Queue::new(),
        }
    }
}

impl GridCommands {
    pub fn push(&mut self, command: GridCommand) -> Result<(), GridCommandError> {
        if self.queue.size() >= COMMAND_CAPACITY || self.queue.add(command).is_err() {
            return Err(GridCommandError::QueueFull);
        }
        Ok(())
    }

    pub fn pop(&mut self) -> Option<GridCommand> {
        self.queue.remove().ok()
    }

    pub fn len(&self) -> usize {
        self.queue.size()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.size() == 0
    }
}

#[derive(Resource)]
pub struct GridRng(pub fastrand::Rng);

impl Default for GridRng {
    fn default() -> Self {
        Self(fastrand::Rng::new())
    }
}

/// Row-major slot grid with a cursor and pickup state.
///
/// While a pickup is in progress the held item always sits in the cursor
/// slot, so navigation swaps it with whatever occupies the destination. Item
/// count is conserved under any command sequence.
#[derive(Resource)]
pub struct InventoryGrid {
    width: usize,
    slots: Vec<Option<ItemId>>,
    cursor: usize,
    held: Option<ItemId>,
    origin: Option<usize>,
}

impl InventoryGrid {
    pub fn new(width: usize, slot_count: usize) -> Self {
        let width = width.max(1);
        Self {
            width,
            slots: vec![None; slot_count.max(width)],
            cursor: 0,
            held: None,
            origin: None,
        }
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    pub const fn held(&self) -> Option<ItemId> {
        self.held
    }

    pub const fn origin(&self) -> Option<usize> {
        self.origin
    }

    pub fn item_at(&self, slot: usize) -> Option<ItemId> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Moves the cursor one step, clamped to the grid. During a pickup the
    /// held item rides with the cursor and the displaced item drops into the
    /// vacated slot.
    pub fn navigate(&mut self, direction: Direction) -> Vec<GridEvent> {
        let destination = self.candidate(direction);
        if destination == self.cursor {
            return Vec::new();
        }
        debug!(?direction, from = self.cursor, to = destination, "navigate");

        let mut events = Vec::new();
        if self.held.is_some() {
            self.slots.swap(self.cursor, destination);
            events.push(GridEvent::SlotChanged {
                slot: self.cursor,
                item: self.item_at(self.cursor),
            });
            events.push(GridEvent::SlotChanged {
                slot: destination,
                item: self.item_at(destination),
            });
        }
        self.cursor = destination;
        events.push(GridEvent::CursorMoved { slot: destination });
        events
    }

    /// Toggles pickup at the cursor slot. Picking up an empty slot is a
    /// no-op; the second call deposits the held item where the cursor is.
    pub fn select(&mut self) -> Vec<GridEvent> {
        if let Some(item) = self.held.take() {
            self.origin = None;
            debug!(slot = self.cursor, "put down");
            return vec![GridEvent::ItemPlaced {
                slot: self.cursor,
                item,
            }];
        }

        match self.item_at(self.cursor) {
            Some(item) => {
                self.held = Some(item);
                self.origin = Some(self.cursor);
                debug!(slot = self.cursor, "pick up");
                vec![GridEvent::ItemPicked {
                    slot: self.cursor,
                    item,
                }]
            }
            None => Vec::new(),
        }
    }

    /// Clears the grid and pickup state, then fills `amount` distinct slots
    /// (shuffle-and-take) with items drawn uniformly from the pool. Draws are
    /// independent, so the same item can land in several slots.
    pub fn shuffle(
        &mut self,
        amount: usize,
        pool_len: usize,
        rng: &mut fastrand::Rng,
    ) -> Vec<GridEvent> {
        self.held = None;
        self.origin = None;
        for slot in &mut self.slots {
            *slot = None;
        }

        let mut filled = 0;
        if pool_len > 0 {
            let mut indices: Vec<usize> = (0..self.slots.len()).collect();
            rng.shuffle(&mut indices);
            for &index in indices.iter().take(amount.min(self.slots.len())) {
                if let Some(slot) = self.slots.get_mut(index) {
                    *slot = Some(ItemId(rng.usize(..pool_len)));
                    filled += 1;
                }
            }
        }
        debug!(amount, filled, "shuffle");

        let mut events: Vec<GridEvent> = self
            .slots
            .iter()
            .enumerate()
            .map(|(slot, item)| GridEvent::SlotChanged { slot, item: *item })
            .collect();
        events.push(GridEvent::Shuffled { filled });
        events
    }

    // Clamped candidate index: vertical moves stay put at the top and bottom
    // rows, horizontal moves clamp at the first and last slot.
    fn candidate(&self, direction: Direction) -> usize {
        let last = self.slots.len().saturating_sub(1);
        match direction {
            Direction::Up => {
                if self.cursor >= self.width {
                    self.cursor - self.width
                } else {
                    self.cursor
                }
            }
            Direction::Down => {
                if self.cursor + self.width <= last {
                    self.cursor + self.width
                } else {
                    self.cursor
                }
            }
            Direction::Left => self.cursor.saturating_sub(1),
            Direction::Right => (self.cursor + 1).min(last),
        }
    }

    #[cfg(test)]
    fn place(&mut self, slot: usize, item: Option<ItemId>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = item;
        }
    }
}

pub struct GridPlugin;

impl Plugin for GridPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GridCommands>()
            .init_resource::<GridRng>()
            .insert_resource(InventoryGrid::new(GRID_WIDTH, SLOT_COUNT))
            .add_event::<GridEvent>()
            .add_systems(OnEnter(GameState::Game), queue_initial_shuffle)
            .add_systems(
                Update,
                apply_commands.run_if(in_state(GameState::Game)),
            );
    }
}

fn queue_initial_shuffle(mut grid_commands: ResMut<GridCommands>) {
    if let Err(err) = grid_commands.push(GridCommand::Shuffle {
        amount: DEFAULT_SHUFFLE_AMOUNT,
    }) {
        error!("{err}");
    }
}

fn apply_commands(
    mut grid: ResMut<InventoryGrid>,
    mut grid_commands: ResMut<GridCommands>,
    mut rng: ResMut<GridRng>,
    catalog: Res<ItemCatalog>,
    mut events: EventWriter<GridEvent>,
) {
    while let Some(command) = grid_commands.pop() {
        let produced = match command {
            GridCommand::Navigate(direction) => grid.navigate(direction),
            GridCommand::Select => grid.select(),
            GridCommand::Shuffle { amount } => grid.shuffle(amount, catalog.len(), &mut rng.0),
        };
        events.send_batch(produced);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(grid: &InventoryGrid) -> Vec<Option<ItemId>> {
        (0..grid.len()).map(|slot| grid.item_at(slot)).collect()
    }

    fn sorted_item_ids(grid: &InventoryGrid) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = items(grid).into_iter().flatten().collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn cursor_never_leaves_bounds() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        for _ in 0..SLOT_COUNT + 3 {
            grid.navigate(Direction::Right);
            assert!(grid.cursor() < grid.len(), "cursor out of bounds");
        }
        assert_eq!(grid.cursor(), SLOT_COUNT - 1);
        for _ in 0..SLOT_COUNT + 3 {
            grid.navigate(Direction::Left);
            assert!(grid.cursor() < grid.len(), "cursor out of bounds");
        }
        assert_eq!(grid.cursor(), 0);
    }

    #[test]
    fn vertical_moves_stop_at_edges() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        // Top row: up is a no-op, not a wrap
        assert!(grid.navigate(Direction::Up).is_empty());
        assert_eq!(grid.cursor(), 0);

        grid.navigate(Direction::Down);
        assert_eq!(grid.cursor(), GRID_WIDTH);

        // Bottom row: down is a no-op
        assert!(grid.navigate(Direction::Down).is_empty());
        assert_eq!(grid.cursor(), GRID_WIDTH);

        grid.navigate(Direction::Up);
        assert_eq!(grid.cursor(), 0);
    }

    #[test]
    fn horizontal_moves_cross_rows() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        for _ in 0..GRID_WIDTH {
            grid.navigate(Direction::Right);
        }
        // Stepping right off the end of the first row lands on the second
        assert_eq!(grid.cursor(), GRID_WIDTH);
        grid.navigate(Direction::Left);
        assert_eq!(grid.cursor(), GRID_WIDTH - 1);
    }

    #[test]
    fn pickup_swaps_along_the_way() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        let a = ItemId(0);
        let b = ItemId(1);
        grid.place(0, Some(a));
        grid.place(1, Some(b));

        assert_eq!(grid.select(), vec![GridEvent::ItemPicked { slot: 0, item: a }]);
        assert_eq!(grid.held(), Some(a));
        assert_eq!(grid.origin(), Some(0));

        let events = grid.navigate(Direction::Right);
        assert_eq!(
            events,
            vec![
                GridEvent::SlotChanged {
                    slot: 0,
                    item: Some(b)
                },
                GridEvent::SlotChanged {
                    slot: 1,
                    item: Some(a)
                },
                GridEvent::CursorMoved { slot: 1 },
            ]
        );
        assert_eq!(grid.item_at(0), Some(b));
        assert_eq!(grid.item_at(1), Some(a));
        assert_eq!(grid.held(), Some(a));

        assert_eq!(grid.select(), vec![GridEvent::ItemPlaced { slot: 1, item: a }]);
        assert_eq!(grid.held(), None);
        assert_eq!(grid.origin(), None);
        assert_eq!(grid.item_at(1), Some(a));
    }

    #[test]
    fn items_conserved_during_pickup() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        grid.place(0, Some(ItemId(3)));
        grid.place(4, Some(ItemId(1)));
        grid.place(7, Some(ItemId(1)));
        grid.place(11, Some(ItemId(5)));
        let before = sorted_item_ids(&grid);

        grid.select();
        for direction in [
            Direction::Right,
            Direction::Down,
            Direction::Right,
            Direction::Right,
            Direction::Up,
            Direction::Left,
            Direction::Down,
        ] {
            grid.navigate(direction);
            assert_eq!(sorted_item_ids(&grid), before, "item lost or duplicated");
        }
        grid.select();
        assert_eq!(sorted_item_ids(&grid), before);
    }

    #[test]
    fn double_select_restores_placement() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        grid.place(0, Some(ItemId(2)));
        grid.place(5, Some(ItemId(4)));
        let before = items(&grid);

        grid.select();
        grid.select();
        assert_eq!(items(&grid), before);
        assert_eq!(grid.held(), None);
    }

    #[test]
    fn select_on_empty_slot_is_a_noop() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        assert!(grid.select().is_empty());
        assert_eq!(grid.held(), None);
        assert_eq!(grid.origin(), None);
    }

    #[test]
    fn shuffle_fills_exactly_the_requested_amount() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        let mut rng = fastrand::Rng::with_seed(7);

        let events = grid.shuffle(5, 8, &mut rng);
        assert_eq!(grid.occupied(), 5);
        assert_eq!(
            events.last(),
            Some(&GridEvent::Shuffled { filled: 5 }),
            "shuffle should report the fill count"
        );
        // One SlotChanged per slot plus the summary
        assert_eq!(events.len(), SLOT_COUNT + 1);
    }

    #[test]
    fn shuffle_amount_is_clamped_to_the_grid() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        let mut rng = fastrand::Rng::with_seed(11);
        grid.shuffle(100, 8, &mut rng);
        assert_eq!(grid.occupied(), SLOT_COUNT);
    }

    #[test]
    fn shuffle_with_empty_pool_only_clears() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        grid.place(2, Some(ItemId(0)));
        let mut rng = fastrand::Rng::with_seed(3);

        let events = grid.shuffle(5, 0, &mut rng);
        assert_eq!(grid.occupied(), 0);
        assert_eq!(events.last(), Some(&GridEvent::Shuffled { filled: 0 }));
    }

    #[test]
    fn shuffle_clears_pickup_state() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        grid.place(0, Some(ItemId(1)));
        grid.select();
        assert!(grid.held().is_some());

        let mut rng = fastrand::Rng::with_seed(5);
        grid.shuffle(4, 8, &mut rng);
        assert_eq!(grid.held(), None);
        assert_eq!(grid.origin(), None);
    }

    #[test]
    fn command_queue_rejects_overflow() {
        let mut commands = GridCommands::default();
        for _ in 0..COMMAND_CAPACITY {
            assert_eq!(commands.push(GridCommand::Select), Ok(()));
        }
        assert_eq!(
            commands.push(GridCommand::Select),
            Err(GridCommandError::QueueFull)
        );
        assert_eq!(commands.len(), COMMAND_CAPACITY);

        assert_eq!(commands.pop(), Some(GridCommand::Select));
        assert_eq!(commands.push(GridCommand::Select), Ok(()));
    }

    #[test]
    fn navigate_into_a_wall_produces_no_events() {
        let mut grid = InventoryGrid::new(GRID_WIDTH, SLOT_COUNT);
        grid.place(0, Some(ItemId(0)));
        grid.select();
        // Held at the top-left corner: up and left are both walls
        assert!(grid.navigate(Direction::Up).is_empty());
        assert!(grid.navigate(Direction::Left).is_empty());
        assert_eq!(grid.item_at(0), Some(ItemId(0)));
    }
}
