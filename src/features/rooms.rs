// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room switches.
//!
//! Each room of the map gets a switch `room-<segment id>`. Turning switches
//! on while the robot is idle builds a selection; the next start (main
//! switch, pause resume, or the auto-start timer) cleans exactly those rooms.
//! The selection is dropped whenever the robot reports it is not cleaning.
//!
//! With `instant_room_clean` the switches are momentary and start cleaning
//! their room right away.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use super::{CoreContext, FeatureModule, bind_get, bind_set, subscribe};
use crate::accessory::{Characteristic, ElementKind, UiElement, sanitize_name};
use crate::command::DeviceCommand;
use crate::device::Room;
use crate::error::Result;
use crate::inventory::{InventoryReconciler, ReconcileOutcome};
use crate::state::{StateChangeEvent, keys};
use crate::subscription::{Dedup, KeyFilter};

/// Element id prefix of room switches.
const ROOM_PREFIX: &str = "room-";

/// Room selection switches.
pub struct RoomsFeature {
    ctx: Arc<CoreContext>,
    rooms: InventoryReconciler<Room>,
    selection: Mutex<Vec<u32>>,
    auto_start: Mutex<Option<JoinHandle<()>>>,
}

impl RoomsFeature {
    /// Creates the switches for the configured rooms.
    #[must_use]
    pub fn new(ctx: &Arc<CoreContext>) -> Arc<Self> {
        let feature = Arc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let naming = Arc::clone(ctx);
            let rooms = InventoryReconciler::new(
                Arc::clone(ctx.accessory()),
                ROOM_PREFIX,
                ElementKind::Switch,
                move |room: &Room| naming.config().clean_name(&sanitize_name(&room.name)),
                move |room: &Room, element: &Arc<UiElement>| {
                    if let Some(this) = weak.upgrade() {
                        this.bind_room(room.id, element);
                    }
                },
            );
            Self {
                ctx: Arc::clone(ctx),
                rooms,
                selection: Mutex::new(Vec::new()),
                auto_start: Mutex::new(None),
            }
        });
        feature.rooms.reconcile(&ctx.config().rooms);
        feature
    }

    /// Returns the selected room ids in selection order.
    #[must_use]
    pub fn selected_rooms(&self) -> Vec<u32> {
        self.selection.lock().clone()
    }

    /// Returns `true` if the room is selected.
    #[must_use]
    pub fn is_selected(&self, room: u32) -> bool {
        self.selection.lock().contains(&room)
    }

    /// Returns the ids of the exposed rooms.
    #[must_use]
    pub fn room_ids(&self) -> Vec<u32> {
        self.rooms.ids()
    }

    /// Adds a room to, or removes it from, the selection.
    ///
    /// Ignored while a job runs or is paused. Restarts the auto-start timer
    /// when one is configured.
    pub fn select_room(self: &Arc<Self>, room: u32, selected: bool) {
        let device = self.ctx.device();
        if device.is_cleaning() || device.is_paused() {
            tracing::debug!(room, selected, "Robot busy, room selection unchanged");
            return;
        }
        tracing::info!(room, selected, "Room selection changed");
        {
            let mut selection = self.selection.lock();
            selection.retain(|id| *id != room);
            if selected {
                selection.push(room);
            }
        }
        self.schedule_auto_start();
    }

    /// Reconciles the switches against the device's room list.
    ///
    /// An empty device list leaves the configured rooms in place.
    ///
    /// # Errors
    ///
    /// Returns `Error::Command` if the room list cannot be fetched.
    pub async fn refresh(&self) -> Result<ReconcileOutcome> {
        let listed = self.ctx.device().room_list().await?;
        let outcome = if listed.is_empty() {
            self.rooms.reconcile(&self.ctx.config().rooms)
        } else {
            self.rooms.reconcile(&listed)
        };
        let exposed = self.rooms.ids();
        self.selection.lock().retain(|id| exposed.contains(id));
        Ok(outcome)
    }

    fn bind_room(self: &Arc<Self>, room: u32, element: &Arc<UiElement>) {
        if self.ctx.config().instant_room_clean {
            self.ctx
                .bind_momentary(element, DeviceCommand::SegmentClean(vec![room]));
            return;
        }
        element.update_value(Characteristic::On, self.is_selected(room));
        bind_get(element, Characteristic::On, self, move |this| this.is_selected(room));
        let weak_element = Arc::downgrade(element);
        bind_set(element, Characteristic::On, self, move |this, value| {
            let weak_element = weak_element.clone();
            async move {
                this.select_room(room, value.as_bool()?);
                if let Some(element) = weak_element.upgrade() {
                    element.update_value(Characteristic::On, this.is_selected(room));
                }
                Ok(())
            }
        });
    }

    fn schedule_auto_start(self: &Arc<Self>) {
        let Some(delay) = self.ctx.config().room_timeout() else {
            return;
        };
        let empty = self.selection.lock().is_empty();
        let mut pending = self.auto_start.lock();
        if let Some(task) = pending.take() {
            task.abort();
        }
        if empty {
            return;
        }
        tracing::debug!(delay_secs = delay.as_secs(), "Scheduling room auto-start");
        let weak = Arc::downgrade(self);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(this) = weak.upgrade() {
                this.auto_start().await;
            }
        }));
    }

    async fn auto_start(&self) {
        let rooms = self.selected_rooms();
        if rooms.is_empty() || self.ctx.device().is_cleaning() {
            return;
        }
        tracing::info!(?rooms, "Room selection timed out, starting cleaning");
        if let Err(err) = self.ctx.start_cleaning(rooms).await {
            tracing::error!(error = %err, "Room auto-start failed");
        }
    }

    fn cancel_auto_start(&self) {
        if let Some(task) = self.auto_start.lock().take() {
            task.abort();
        }
    }

    fn on_state(&self, event: &StateChangeEvent) {
        if event.state_code().is_cleaning() {
            return;
        }
        self.selection.lock().clear();
        self.cancel_auto_start();
        for element in self.rooms.elements() {
            element.update_value(Characteristic::On, false);
        }
    }
}

impl FeatureModule for RoomsFeature {
    fn name(&self) -> &'static str {
        "rooms"
    }

    fn init(self: Arc<Self>) -> Result<()> {
        for element in self.rooms.elements() {
            element.update_value(Characteristic::On, false);
        }
        subscribe(
            &self.ctx,
            &self,
            KeyFilter::key(keys::STATE),
            Dedup::None,
            Self::on_state,
        );
        Ok(())
    }

    fn elements(&self) -> Vec<Arc<UiElement>> {
        self.rooms.elements()
    }
}

impl Drop for RoomsFeature {
    fn drop(&mut self) {
        self.cancel_auto_start();
    }
}

impl std::fmt::Debug for RoomsFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomsFeature")
            .field("rooms", &self.rooms)
            .field("selection", &self.selected_rooms())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::capabilities::Capabilities;
    use crate::config::Config;
    use crate::device::fake::FakeDevice;
    use crate::features::testing;

    fn setup(config: Config) -> (Arc<CoreContext>, Arc<FakeDevice>, Arc<RoomsFeature>) {
        let config = config.with_rooms(vec![Room::new(16, "Kitchen"), Room::new(17, "Living room")]);
        let (ctx, fake) = testing::context(config, Capabilities::default());
        fake.set_status(keys::STATE, json!(8));
        let feature = RoomsFeature::new(&ctx);
        Arc::clone(&feature).init().unwrap();
        (ctx, fake, feature)
    }

    #[test]
    fn creates_configured_rooms() {
        let (ctx, _fake, feature) = setup(Config::default());
        assert_eq!(feature.room_ids(), vec![16, 17]);
        let kitchen = ctx.accessory().element("room-16").unwrap();
        assert_eq!(kitchen.name(), "cleaning Kitchen");
    }

    #[tokio::test]
    async fn selection_follows_switches() {
        let (ctx, _fake, feature) = setup(Config::default());
        let accessory = ctx.accessory();

        accessory.handle_set("room-17", Characteristic::On, true).await.unwrap();
        accessory.handle_set("room-16", Characteristic::On, true).await.unwrap();
        assert_eq!(feature.selected_rooms(), vec![17, 16]);

        accessory.handle_set("room-17", Characteristic::On, false).await.unwrap();
        assert_eq!(feature.selected_rooms(), vec![16]);
        assert_eq!(
            accessory.handle_get("room-16", Characteristic::On).unwrap().as_bool(),
            Ok(true)
        );
    }

    #[tokio::test]
    async fn selection_ignored_while_cleaning() {
        let (ctx, fake, feature) = setup(Config::default());
        fake.set_status(keys::STATE, json!(5));

        ctx.accessory()
            .handle_set("room-16", Characteristic::On, true)
            .await
            .unwrap();
        assert!(feature.selected_rooms().is_empty());
        assert!(!ctx.accessory().element("room-16").unwrap().bool_value(Characteristic::On));
    }

    #[tokio::test]
    async fn idle_state_clears_selection() {
        let (ctx, _fake, feature) = setup(Config::default());
        ctx.accessory()
            .handle_set("room-16", Characteristic::On, true)
            .await
            .unwrap();

        ctx.device().emit_state_change(keys::STATE, json!(3));
        assert!(feature.selected_rooms().is_empty());
        assert!(feature
            .elements()
            .iter()
            .all(|element| !element.bool_value(Characteristic::On)));
    }

    #[tokio::test(start_paused = true)]
    async fn auto_start_after_timeout() {
        let config = Config::default().with_room_timeout(Duration::from_secs(30));
        let (ctx, fake, _feature) = setup(config);

        ctx.accessory()
            .handle_set("room-16", Characteristic::On, true)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(20)).await;
        ctx.accessory()
            .handle_set("room-17", Characteristic::On, true)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(fake.sent().is_empty());

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(fake.sent(), vec![DeviceCommand::SegmentClean(vec![16, 17])]);
    }

    #[tokio::test(start_paused = true)]
    async fn emptied_selection_cancels_auto_start() {
        let config = Config::default().with_room_timeout(Duration::from_secs(10));
        let (ctx, fake, _feature) = setup(config);

        ctx.accessory()
            .handle_set("room-16", Characteristic::On, true)
            .await
            .unwrap();
        ctx.accessory()
            .handle_set("room-16", Characteristic::On, false)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert!(fake.sent().is_empty());
    }

    #[tokio::test]
    async fn instant_rooms_clean_right_away() {
        let config = Config::default().with_instant_room_clean(true);
        let (ctx, fake, feature) = setup(config);

        ctx.accessory()
            .handle_set("room-17", Characteristic::On, true)
            .await
            .unwrap();
        assert_eq!(fake.sent(), vec![DeviceCommand::SegmentClean(vec![17])]);
        assert!(feature.selected_rooms().is_empty());
    }

    #[tokio::test]
    async fn refresh_uses_device_rooms() {
        let (ctx, fake, feature) = setup(Config::default());
        ctx.accessory()
            .handle_set("room-17", Characteristic::On, true)
            .await
            .unwrap();
        fake.set_rooms(vec![Room::new(16, "Kitchen"), Room::new(18, "Office")]);

        let outcome = feature.refresh().await.unwrap();
        assert_eq!(outcome.removed.len(), 1);
        assert_eq!(feature.room_ids(), vec![16, 18]);
        assert!(feature.selected_rooms().is_empty());

        fake.set_rooms(Vec::new());
        feature.refresh().await.unwrap();
        assert_eq!(feature.room_ids(), vec![16, 17]);
    }
}
