use tracing::info;

use crate::error::AppError;

/// A country saved by the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    /// ISO 3166-1 alpha-3 code
    pub code: String,
    pub name: String,
}

/// Session-scoped login and favorites. Nothing outlives the process.
#[derive(Debug, Default)]
pub struct Session {
    current_user: Option<String>,
    favorites: Vec<Favorite>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Email-only login: anything containing `@` is accepted.
    pub fn login(&mut self, email: &str) -> Result<(), AppError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(AppError::InvalidEmail(email.to_string()));
        }
        info!("User logged in: {}", email);
        self.current_user = Some(email.to_string());
        Ok(())
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.current_user.take() {
            info!("User logged out: {}", user);
        }
    }

    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    /// Adds or removes a favorite. Returns whether it is now a favorite.
    pub fn toggle_favorite(&mut self, code: &str, name: &str) -> Result<bool, AppError> {
        if self.current_user.is_none() {
            return Err(AppError::LoginRequired("save favorites".to_string()));
        }

        if let Some(pos) = self.favorites.iter().position(|f| f.code == code) {
            let removed = self.favorites.remove(pos);
            info!("Removed favorite {} ({})", removed.name, removed.code);
            return Ok(false);
        }

        self.favorites.push(Favorite {
            code: code.to_string(),
            name: name.to_string(),
        });
        info!("Added favorite {} ({})", name, code);
        Ok(true)
    }

    pub fn is_favorite(&self, code: &str) -> bool {
        self.favorites.iter().any(|f| f.code == code)
    }

    pub fn favorites(&self) -> &[Favorite] {
        &self.favorites
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_an_at_sign() {
        let mut session = Session::new();
        assert!(matches!(
            session.login("not-an-email"),
            Err(AppError::InvalidEmail(_))
        ));
        assert_eq!(session.current_user(), None);

        session.login(" ana@example.com ").unwrap();
        assert_eq!(session.current_user(), Some("ana@example.com"));

        session.logout();
        assert_eq!(session.current_user(), None);
    }

    #[test]
    fn favorites_need_login() {
        let mut session = Session::new();
        let err = session.toggle_favorite("NPL", "Nepal").unwrap_err();
        assert!(matches!(err, AppError::LoginRequired(_)));
        assert!(session.favorites().is_empty());
    }

    #[test]
    fn toggling_adds_then_removes() {
        let mut session = Session::new();
        session.login("ana@example.com").unwrap();

        assert!(session.toggle_favorite("NPL", "Nepal").unwrap());
        assert!(session.toggle_favorite("JPN", "Japan").unwrap());
        assert!(session.is_favorite("NPL"));
        assert_eq!(session.favorites().len(), 2);

        assert!(!session.toggle_favorite("NPL", "Nepal").unwrap());
        assert!(!session.is_favorite("NPL"));
        assert_eq!(
            session.favorites(),
            &[Favorite {
                code: "JPN".to_string(),
                name: "Japan".to_string()
            }]
        );
    }
}
