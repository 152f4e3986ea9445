use tracing::info;

use crate::{
    components::{
        announcement::{Announcement, AnnouncementError},
        id::{AnnouncementId, PlayerId},
    },
    engine::{
        error::GameError,
        event::{Change, EventKind},
        game_state::GameState,
    },
};

fn index_of(game_state: &GameState, id: AnnouncementId) -> Result<usize, AnnouncementError> {
    game_state
        .announcements
        .iter()
        .position(|announcement| announcement.id == id)
        .ok_or(AnnouncementError::UnknownAnnouncement(id))
}

pub fn create_announcement(
    game_state: &mut GameState,
    admin: PlayerId,
    title: &str,
    message: &str,
) -> Result<AnnouncementId, GameError> {
    game_state.ensure_admin(admin)?;
    let title = title.trim();
    if title.is_empty() {
        return Err(AnnouncementError::EmptyTitle.into());
    }
    let announcement = Announcement::new(admin, title, message.trim());
    let id = announcement.id;
    game_state.announcements.push(announcement);

    info!("Announcement {} created by {}", id, admin);
    game_state.emit(EventKind::AnnouncementChanged {
        announcement: id,
        change: Change::Created,
    });
    Ok(id)
}

pub fn update_announcement(
    game_state: &mut GameState,
    admin: PlayerId,
    id: AnnouncementId,
    title: &str,
    message: &str,
) -> Result<(), GameError> {
    game_state.ensure_admin(admin)?;
    let title = title.trim();
    if title.is_empty() {
        return Err(AnnouncementError::EmptyTitle.into());
    }
    let index = index_of(game_state, id)?;
    let announcement = &mut game_state.announcements[index];
    announcement.title = title.to_string();
    announcement.message = message.trim().to_string();
    announcement.touch();

    game_state.emit(EventKind::AnnouncementChanged {
        announcement: id,
        change: Change::Updated,
    });
    Ok(())
}

/// Flips the active flag and returns the new value.
pub fn toggle_announcement(
    game_state: &mut GameState,
    admin: PlayerId,
    id: AnnouncementId,
) -> Result<bool, GameError> {
    game_state.ensure_admin(admin)?;
    let index = index_of(game_state, id)?;
    let announcement = &mut game_state.announcements[index];
    announcement.active = !announcement.active;
    announcement.touch();
    let active = announcement.active;

    info!("Announcement {} is now {}", id, if active { "active" } else { "hidden" });
    game_state.emit(EventKind::AnnouncementChanged {
        announcement: id,
        change: Change::Updated,
    });
    Ok(active)
}

pub fn delete_announcement(
    game_state: &mut GameState,
    admin: PlayerId,
    id: AnnouncementId,
) -> Result<Announcement, GameError> {
    game_state.ensure_admin(admin)?;
    let index = index_of(game_state, id)?;
    let removed = game_state.announcements.remove(index);

    info!("Announcement {} deleted by {}", id, admin);
    game_state.emit(EventKind::AnnouncementChanged {
        announcement: id,
        change: Change::Deleted,
    });
    Ok(removed)
}

/// What players see: active announcements, newest first.
pub fn active_announcements(game_state: &GameState) -> Vec<&Announcement> {
    game_state
        .announcements
        .iter()
        .rev()
        .filter(|announcement| announcement.active)
        .collect()
}

pub fn all_announcements(
    game_state: &GameState,
    admin: PlayerId,
) -> Result<Vec<&Announcement>, GameError> {
    game_state.ensure_admin(admin)?;
    Ok(game_state.announcements.iter().rev().collect())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{
        engine::error::AccessError,
        test_utils::fixtures::{self, game_state},
    };

    #[rstest]
    fn admin_manages_announcements(mut game_state: GameState) {
        let admin = fixtures::admin(&mut game_state);
        let first = create_announcement(&mut game_state, admin, "Patch 1", "Hello").unwrap();
        let second = create_announcement(&mut game_state, admin, "Patch 2", "More").unwrap();

        let active: Vec<AnnouncementId> =
            active_announcements(&game_state).iter().map(|a| a.id).collect();
        assert_eq!(active, vec![second, first]);

        assert!(!toggle_announcement(&mut game_state, admin, first).unwrap());
        assert_eq!(active_announcements(&game_state).len(), 1);
        assert_eq!(all_announcements(&game_state, admin).unwrap().len(), 2);

        update_announcement(&mut game_state, admin, second, " Patch 2.1 ", "Fixed").unwrap();
        assert_eq!(active_announcements(&game_state)[0].title, "Patch 2.1");

        delete_announcement(&mut game_state, admin, first).unwrap();
        assert!(matches!(
            delete_announcement(&mut game_state, admin, first),
            Err(GameError::Announcement(AnnouncementError::UnknownAnnouncement(_)))
        ));
    }

    #[rstest]
    fn users_cannot_manage_announcements(mut game_state: GameState) {
        let alice = fixtures::alice(&mut game_state);
        assert!(matches!(
            create_announcement(&mut game_state, alice, "Hi", "there"),
            Err(GameError::Access(AccessError::NotAdmin { .. }))
        ));
        assert!(matches!(
            all_announcements(&game_state, alice),
            Err(GameError::Access(AccessError::NotAdmin { .. }))
        ));
    }

    #[rstest]
    fn empty_title_is_rejected(mut game_state: GameState) {
        let admin = fixtures::admin(&mut game_state);
        assert!(matches!(
            create_announcement(&mut game_state, admin, "  ", "body"),
            Err(GameError::Announcement(AnnouncementError::EmptyTitle))
        ));
    }
}
