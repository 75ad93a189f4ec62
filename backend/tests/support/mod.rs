//! Shared fixtures for the HTTP API integration tests: an in-memory user
//! repository honouring the port contract, a scripted clock for driving
//! rate-limit windows, and helpers for assembling the application.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use backend::domain::ports::{RateLimiter, UserRepository, UserRepositoryError};
use backend::domain::{
    EmailAddress, NewUser, PageRequest, PhoneNumber, User, UserId, UserName, UserPage, UserPatch,
    UsersService,
};
use backend::outbound::ratelimit::FixedWindowLimiter;
use backend::server::AppDependencies;

/// Fixed origin for fixture timestamps.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Convenience constructor for validated fixture input.
pub fn new_user(name: &str, email: &str, phone: Option<&str>) -> NewUser {
    NewUser {
        name: UserName::new(name).expect("valid name"),
        email: EmailAddress::new(email).expect("valid email"),
        phone: phone.map(|raw| PhoneNumber::new(raw).expect("valid phone")),
    }
}

/// In-memory stand-in for the persistence adapter. Ids are sequential,
/// duplicate emails are rejected, and `updated_at` advances on every real
/// mutation so timestamp assertions behave like the database.
#[derive(Default)]
pub struct FakeUserRepository {
    rows: Mutex<Vec<User>>,
}

impl FakeUserRepository {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seeded(users: Vec<NewUser>) -> Arc<Self> {
        let repository = Self::empty();
        {
            let mut rows = repository.rows.lock().expect("rows lock");
            for (index, user) in users.into_iter().enumerate() {
                let id = i32::try_from(index).expect("small seed") + 1;
                let at = base_time();
                rows.push(User::new(
                    UserId::new(id),
                    user.name,
                    user.email,
                    user.phone,
                    at,
                    at,
                ));
            }
        }
        repository
    }

    fn next_id(rows: &[User]) -> i32 {
        rows.iter().map(|row| row.id().as_i32()).max().unwrap_or(0) + 1
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn insert(&self, new_user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        if rows.iter().any(|row| row.email() == &new_user.email) {
            return Err(UserRepositoryError::duplicate_email("users_email_key"));
        }
        let id = Self::next_id(&rows);
        let at = base_time() + Duration::seconds(i64::from(id));
        let user = User::new(
            UserId::new(id),
            new_user.name.clone(),
            new_user.email.clone(),
            new_user.phone.clone(),
            at,
            at,
        );
        rows.push(user.clone());
        Ok(user)
    }

    async fn list(&self, page: PageRequest) -> Result<UserPage, UserRepositoryError> {
        let rows = self.rows.lock().expect("rows lock");
        let mut users: Vec<User> = rows.clone();
        users.sort_by_key(|user| std::cmp::Reverse(user.id()));
        let users = users
            .into_iter()
            .skip(usize::try_from(page.offset()).expect("clamped offset"))
            .take(usize::try_from(page.limit()).expect("clamped limit"))
            .collect();
        Ok(UserPage {
            users,
            total: i64::try_from(rows.len()).expect("small table"),
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let rows = self.rows.lock().expect("rows lock");
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn search(&self, query: &str, limit: i64) -> Result<Vec<User>, UserRepositoryError> {
        let needle = query.to_lowercase();
        let rows = self.rows.lock().expect("rows lock");
        let mut matches: Vec<User> = rows
            .iter()
            .filter(|row| {
                row.name().as_ref().to_lowercase().contains(&needle)
                    || row.email().as_ref().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|user| std::cmp::Reverse(user.id()));
        matches.truncate(usize::try_from(limit).expect("small cap"));
        Ok(matches)
    }

    async fn update(
        &self,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<Option<User>, UserRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        if let Some(email) = &patch.email
            && rows.iter().any(|row| row.email() == email && row.id() != id)
        {
            return Err(UserRepositoryError::duplicate_email("users_email_key"));
        }
        let Some(current) = rows.iter_mut().find(|row| row.id() == id) else {
            return Ok(None);
        };
        let updated = User::new(
            current.id(),
            patch.name.clone().unwrap_or_else(|| current.name().clone()),
            patch
                .email
                .clone()
                .unwrap_or_else(|| current.email().clone()),
            patch.phone.clone().or_else(|| current.phone().cloned()),
            current.created_at(),
            current.updated_at() + Duration::seconds(1),
        );
        *current = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserRepositoryError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        Ok(rows.len() < before)
    }

    async fn ping(&self) -> Result<(), UserRepositoryError> {
        Ok(())
    }
}

/// Test clock that advances only when told to, so rate-limit windows expire
/// deterministically.
pub struct StepClock {
    now: Mutex<DateTime<Utc>>,
}

impl StepClock {
    pub fn starting_at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<chrono::Local> {
        self.utc().with_timezone(&chrono::Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Bundle a repository double with a limiter for [`backend::server::build_app`].
pub fn dependencies(
    repository: Arc<FakeUserRepository>,
    limiter: Arc<dyn RateLimiter>,
) -> AppDependencies {
    AppDependencies::new(UsersService::new(repository), limiter)
}

/// Dependencies with a fresh real limiter; budgets are per test so tests that
/// are not about rate limiting never exhaust them.
pub fn dependencies_unlimited(repository: Arc<FakeUserRepository>) -> AppDependencies {
    let clock = StepClock::starting_at(base_time());
    dependencies(repository, Arc::new(FixedWindowLimiter::new(clock)))
}
