use crate::db::DocumentStore;
use crate::errors::{AppError, AppResult};
use crate::models::{CreateUserPayload, PublicUser, SeedVigilante, User};
use serde_json::Map;
use std::sync::Arc;
use uuid::Uuid;

const LOGIN_FAILED: &str = "invalid credentials";

// Passwords are stored and compared as plain text, matching the existing
// document format.
#[derive(Clone)]
pub struct AccountStore {
    store: Arc<dyn DocumentStore>,
    default_password: String,
}

impl AccountStore {
    pub fn new(store: Arc<dyn DocumentStore>, default_password: &str) -> Self {
        Self {
            store,
            default_password: default_password.to_string(),
        }
    }

    pub fn list(&self) -> AppResult<Vec<PublicUser>> {
        let document = self.store.load()?;
        Ok(document.users.iter().map(PublicUser::from).collect())
    }

    /// Adds every vigilante whose `mat` is not already present. Returns how
    /// many were added.
    pub fn seed(&self, vigilantes: Vec<SeedVigilante>) -> AppResult<usize> {
        let mut document = self.store.load()?;
        let mut added = 0usize;
        for vigilante in vigilantes {
            let mat = vigilante.mat.trim();
            if mat.is_empty() || document.find_user(mat).is_some() {
                continue;
            }
            document.users.push(User {
                mat: mat.to_string(),
                nome: vigilante.nome,
                perfil: vigilante.perfil.unwrap_or_default(),
                password: self.default_password.clone(),
                extra: Map::new(),
            });
            added += 1;
        }
        if added > 0 {
            self.store.save(&document)?;
        }
        tracing::info!(added, "users seeded");
        Ok(added)
    }

    pub fn create(&self, payload: CreateUserPayload) -> AppResult<PublicUser> {
        let mat = payload.mat.trim();
        if mat.is_empty() {
            return Err(AppError::InvalidInput("mat is required".to_string()));
        }
        let mut document = self.store.load()?;
        if document.find_user(mat).is_some() {
            return Err(AppError::InvalidInput(format!("user {} already exists", mat)));
        }
        let user = User {
            mat: mat.to_string(),
            nome: payload.nome,
            perfil: payload.perfil.unwrap_or_default(),
            password: payload
                .password
                .filter(|password| !password.is_empty())
                .unwrap_or_else(|| self.default_password.clone()),
            extra: Map::new(),
        };
        let public = PublicUser::from(&user);
        document.users.push(user);
        self.store.save(&document)?;
        tracing::info!(mat, "user created");
        Ok(public)
    }

    /// Unknown users and wrong passwords fail the same way.
    pub fn login(&self, mat: &str, password: &str) -> AppResult<(PublicUser, String)> {
        let document = self.store.load()?;
        let user = document
            .find_user(mat)
            .filter(|user| !mat.trim().is_empty() && user.password == password);
        match user {
            Some(user) => {
                tracing::info!(mat = user.mat.as_str(), "login succeeded");
                Ok((PublicUser::from(user), Uuid::new_v4().to_string()))
            }
            None => {
                tracing::warn!("login rejected");
                Err(AppError::AuthFailure(LOGIN_FAILED.to_string()))
            }
        }
    }

    pub fn change_password(&self, mat: &str, new_password: &str) -> AppResult<()> {
        if mat.trim().is_empty() {
            return Err(AppError::InvalidInput("mat is required".to_string()));
        }
        let mut document = self.store.load()?;
        let user = document
            .find_user_mut(mat)
            .ok_or_else(|| AppError::NotFound(format!("user {} not found", mat.trim())))?;
        if new_password.is_empty() {
            return Err(AppError::InvalidInput("newPassword is required".to_string()));
        }
        user.password = new_password.to_string();
        self.store.save(&document)?;
        tracing::info!(mat = mat.trim(), "password changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::AccountStore;
    use crate::db::{DocumentStore, MemoryStore};
    use crate::errors::AppError;
    use crate::models::{CreateUserPayload, Perfil, SeedVigilante};
    use std::sync::Arc;

    fn seed(mat: &str, nome: &str) -> SeedVigilante {
        SeedVigilante {
            mat: mat.to_string(),
            nome: nome.to_string(),
            perfil: None,
        }
    }

    #[test]
    fn seeding_skips_existing_and_assigns_default_password() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountStore::new(store.clone(), "1234");
        assert_eq!(accounts.seed(vec![seed("1", "Ana"), seed("2", "Bia")]).expect("seed"), 2);
        assert_eq!(
            accounts
                .seed(vec![seed("2", "Bia"), seed("3", "Caio"), seed("3", "Caio")])
                .expect("seed"),
            1
        );

        let document = store.load().expect("load");
        assert_eq!(document.users.len(), 3);
        assert!(document.users.iter().all(|user| user.password == "1234"));
        assert!(document.users.iter().all(|user| user.perfil == Perfil::User));
    }

    #[test]
    fn seeding_nothing_new_does_not_write() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountStore::new(store.clone(), "1234");
        accounts.seed(vec![seed("1", "Ana")]).expect("seed");
        accounts.seed(vec![seed("1", "Ana")]).expect("seed again");
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn login_strips_password_and_does_not_distinguish_failures() {
        let accounts = AccountStore::new(Arc::new(MemoryStore::new()), "1234");
        accounts.seed(vec![seed("1", "Ana")]).expect("seed");

        let (user, token) = accounts.login("1", "1234").expect("login");
        assert_eq!(user.nome, "Ana");
        assert!(!token.is_empty());
        let as_json = serde_json::to_value(&user).expect("json");
        assert!(as_json.get("password").is_none());

        let wrong = accounts.login("1", "nope").expect_err("wrong password");
        let unknown = accounts.login("9", "1234").expect_err("unknown user");
        assert_eq!(wrong.to_string(), unknown.to_string());
        assert!(matches!(wrong, AppError::AuthFailure(_)));
    }

    #[test]
    fn change_password_for_unknown_user_leaves_document_alone() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountStore::new(store.clone(), "1234");
        accounts.seed(vec![seed("1", "Ana")]).expect("seed");
        let before = store.load().expect("load");

        let result = accounts.change_password("404", "secret");
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(store.load().expect("load"), before);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn change_password_looks_up_the_user_before_the_new_password() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountStore::new(store.clone(), "1234");
        accounts.seed(vec![seed("1", "Ana")]).expect("seed");

        let unknown = accounts.change_password("404", "");
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
        let blank = accounts.change_password("1", "");
        assert!(matches!(blank, Err(AppError::InvalidInput(_))));
        assert_eq!(store.save_count(), 1);
        assert!(accounts.login("1", "1234").is_ok());
    }

    #[test]
    fn change_password_updates_login() {
        let accounts = AccountStore::new(Arc::new(MemoryStore::new()), "1234");
        accounts.seed(vec![seed("1", "Ana")]).expect("seed");
        accounts.change_password("1", "nova").expect("change");
        assert!(accounts.login("1", "1234").is_err());
        assert!(accounts.login("1", "nova").is_ok());
    }

    #[test]
    fn create_rejects_duplicates() {
        let accounts = AccountStore::new(Arc::new(MemoryStore::new()), "1234");
        let payload = CreateUserPayload {
            mat: "7".to_string(),
            nome: "Davi".to_string(),
            perfil: Some(Perfil::Admin),
            password: None,
        };
        let created = accounts.create(payload.clone()).expect("create");
        assert_eq!(created.perfil, Perfil::Admin);
        assert!(matches!(accounts.create(payload), Err(AppError::InvalidInput(_))));
        assert!(accounts.login("7", "1234").is_ok());
        assert_eq!(accounts.list().expect("list").len(), 1);
    }
}
