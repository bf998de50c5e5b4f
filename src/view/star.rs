/// Marker classes on the star icon.
pub const SOLID: &str = "fas";
pub const OUTLINE: &str = "far";
pub const PENDING: &str = "pending";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Solid,
    Outline,
}

impl Glyph {
    pub fn class(self) -> &'static str {
        match self {
            Glyph::Solid => SOLID,
            Glyph::Outline => OUTLINE,
        }
    }
}

/// Per-story favorite toggle.
///
/// A settled state starts a request with [`begin`](Self::begin); a pending
/// state refuses to start another one until it is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteState {
    Unfavorited,
    Favorited,
    PendingFavorite,
    PendingUnfavorite,
}

impl FavoriteState {
    pub fn from_glyph(glyph: Glyph) -> Self {
        match glyph {
            Glyph::Solid => FavoriteState::Favorited,
            Glyph::Outline => FavoriteState::Unfavorited,
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(
            self,
            FavoriteState::PendingFavorite | FavoriteState::PendingUnfavorite
        )
    }

    /// Start a toggle. `None` while one is already in flight.
    pub fn begin(self) -> Option<Self> {
        match self {
            FavoriteState::Unfavorited => Some(FavoriteState::PendingFavorite),
            FavoriteState::Favorited => Some(FavoriteState::PendingUnfavorite),
            FavoriteState::PendingFavorite | FavoriteState::PendingUnfavorite => None,
        }
    }

    /// Resolve a pending toggle with the server's answer.
    pub fn settle(self, confirmed: bool) -> Self {
        match (self, confirmed) {
            (FavoriteState::PendingFavorite, true) => FavoriteState::Favorited,
            (FavoriteState::PendingFavorite, false) => FavoriteState::Unfavorited,
            (FavoriteState::PendingUnfavorite, true) => FavoriteState::Unfavorited,
            (FavoriteState::PendingUnfavorite, false) => FavoriteState::Favorited,
            (settled, _) => settled,
        }
    }

    /// Whether a pending state is asking the server to add the favorite.
    pub fn wants_favorite(self) -> bool {
        matches!(
            self,
            FavoriteState::PendingFavorite | FavoriteState::Favorited
        )
    }

    /// The glyph shown in this state. Pending states show their target.
    pub fn glyph(self) -> Glyph {
        if self.wants_favorite() {
            Glyph::Solid
        } else {
            Glyph::Outline
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_from_settled_states() {
        assert_eq!(
            FavoriteState::Unfavorited.begin(),
            Some(FavoriteState::PendingFavorite)
        );
        assert_eq!(
            FavoriteState::Favorited.begin(),
            Some(FavoriteState::PendingUnfavorite)
        );
    }

    #[test]
    fn test_begin_refused_while_pending() {
        assert_eq!(FavoriteState::PendingFavorite.begin(), None);
        assert_eq!(FavoriteState::PendingUnfavorite.begin(), None);
    }

    #[test]
    fn test_settle_confirmed_and_rejected() {
        let pending = FavoriteState::Unfavorited.begin().unwrap();
        assert_eq!(pending.settle(true), FavoriteState::Favorited);
        assert_eq!(pending.settle(false), FavoriteState::Unfavorited);

        let pending = FavoriteState::Favorited.begin().unwrap();
        assert_eq!(pending.settle(true), FavoriteState::Unfavorited);
        assert_eq!(pending.settle(false), FavoriteState::Favorited);
    }

    #[test]
    fn test_pending_glyph_shows_target() {
        assert_eq!(FavoriteState::PendingFavorite.glyph(), Glyph::Solid);
        assert_eq!(FavoriteState::PendingUnfavorite.glyph(), Glyph::Outline);
        assert_eq!(FavoriteState::from_glyph(Glyph::Solid), FavoriteState::Favorited);
    }
}
