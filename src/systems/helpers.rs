//! Component access for player entities.
//!
//! Every registered player entity carries `Profile`, `Wallet`, `GameProgress`
//! and `Inventory`, so a lookup that fails here is a broken invariant rather
//! than a player error, and panics.

use std::{any::type_name, mem};

use hecs::{Component, ComponentError, Entity, Ref, RefMut, World};
use tracing::error;

pub fn component<T: Component>(world: &World, entity: Entity) -> Ref<'_, T> {
    world
        .get::<&T>(entity)
        .unwrap_or_else(|err| broken_invariant::<T>(entity, err))
}

pub fn component_mut<T: Component>(world: &mut World, entity: Entity) -> RefMut<'_, T> {
    world
        .get::<&mut T>(entity)
        .unwrap_or_else(|err| broken_invariant::<T>(entity, err))
}

pub fn cloned<T: Component + Clone>(world: &World, entity: Entity) -> T {
    T::clone(&component::<T>(world, entity))
}

/// Runs `f` against the component and returns whatever it returns.
pub fn update<T: Component, R>(
    world: &mut World,
    entity: Entity,
    f: impl FnOnce(&mut T) -> R,
) -> R {
    f(&mut *component_mut::<T>(world, entity))
}

/// Swaps in a new value, handing back the old one.
pub fn replace<T: Component>(world: &mut World, entity: Entity, value: T) -> T {
    mem::replace(&mut *component_mut::<T>(world, entity), value)
}

fn broken_invariant<T>(entity: Entity, err: ComponentError) -> ! {
    let name = type_name::<T>();
    error!("Player entity {:?} has no usable `{}`: {}", entity, name, err);
    panic!("player entity {:?} is missing `{}` ({})", entity, name, err);
}
