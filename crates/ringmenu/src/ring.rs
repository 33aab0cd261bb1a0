use crate::front;
use crate::layout;
use crate::rotation::RotationController;
use crate::tuning::Tuning;
use derive_more::{Display, From, Into};
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("ring#{_0}")]
pub struct RingId(u32);

impl RingId {
    pub const MAIN: RingId = RingId(0);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Main,
    Submenu { parent: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, StrumDisplay)]
pub enum Presentation {
    #[default]
    Normal,
    Selected,
}

#[derive(Debug, Clone)]
pub struct RingItem<T> {
    pub index: usize,
    pub angle: f64,
    pub payload: T,
    pub presentation: Presentation,
}

/// Payload contract for ring entries. Entries with children open a submenu
/// when their selection finalizes on the main ring.
pub trait Entry: Clone {
    fn children(&self) -> &[Self] {
        &[]
    }
}

#[derive(Debug)]
pub struct Ring<T> {
    id: RingId,
    owner: Owner,
    items: Vec<RingItem<T>>,
    pub rotation: RotationController,
    current_index: Option<usize>,
}

impl<T> Ring<T> {
    /// Angle that never changes; the item nearest to it is "in front".
    pub const FRONT_REFERENCE_ANGLE: f64 = 0.0;

    pub fn new(id: RingId, owner: Owner, payloads: Vec<T>, tuning: &Tuning) -> Self {
        let angles = layout::angles(payloads.len());
        let items: Vec<_> = payloads
            .into_iter()
            .zip(angles)
            .enumerate()
            .map(|(index, (payload, angle))| RingItem {
                index,
                angle,
                payload,
                presentation: Presentation::Normal,
            })
            .collect();
        let current_index = (!items.is_empty()).then_some(0);

        Self {
            id,
            owner,
            items,
            rotation: RotationController::new(tuning.damping, tuning.settle_epsilon),
            current_index,
        }
    }

    pub fn id(&self) -> RingId {
        self.id
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[RingItem<T>] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&RingItem<T>> {
        self.items.get(index)
    }

    pub(crate) fn item_mut(&mut self, index: usize) -> Option<&mut RingItem<T>> {
        self.items.get_mut(index)
    }

    pub fn angles(&self) -> Vec<f64> {
        self.items.iter().map(|i| i.angle).collect()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub(crate) fn set_current_index(&mut self, index: usize) {
        if index < self.items.len() {
            self.current_index = Some(index);
        }
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.items
            .iter()
            .position(|i| i.presentation == Presentation::Selected)
    }

    /// Rotation that brings `index` to the front along the shorter arc from
    /// the current target, so repeated requests never spin the long way.
    pub fn rotation_for(&self, index: usize) -> Option<f64> {
        let item = self.items.get(index)?;
        let from = self.rotation.target();
        Some(from + layout::shortest_delta(from, Self::FRONT_REFERENCE_ANGLE - item.angle))
    }

    pub fn front_index(&self) -> Option<usize> {
        front::front_index(self.rotation.rotation(), &self.angles())
    }
}
