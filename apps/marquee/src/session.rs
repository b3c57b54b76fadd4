//! In-memory browsing sessions.
//!
//! A session is keyed by the `marquee_session` cookie and holds the state a
//! single browser is interacting with: the mounted hero carousel and one pager
//! per catalog section. Nothing is persisted; idle sessions are swept.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::discovery::{CarouselController, CarouselTiming, Category, FeaturedItem, MediaSummary, Pager, Section};

pub const SESSION_COOKIE: &str = "marquee_session";

pub type HeroCarousel = CarouselController<FeaturedItem>;
pub type CatalogPager = Pager<Category, MediaSummary>;

pub struct Session {
    id: Uuid,
    carousel: Mutex<Option<Arc<HeroCarousel>>>,
    pagers: Mutex<HashMap<Section, Arc<Mutex<CatalogPager>>>>,
    last_seen: Mutex<Instant>,
}

impl Session {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            carousel: Mutex::new(None),
            pagers: Mutex::new(HashMap::new()),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Replace the hero carousel. The previous one is disposed first.
    pub async fn mount_carousel(
        &self,
        items: Vec<FeaturedItem>,
        timing: CarouselTiming,
    ) -> Arc<HeroCarousel> {
        let controller = Arc::new(CarouselController::mount(items, timing));
        let previous = self.carousel.lock().await.replace(Arc::clone(&controller));
        if let Some(previous) = previous {
            previous.dispose();
        }
        controller
    }

    pub async fn carousel(&self) -> Option<Arc<HeroCarousel>> {
        self.carousel.lock().await.clone()
    }

    /// Replace the pager for `section`, as a fresh page load does.
    pub async fn mount_pager(&self, section: Section, pager: CatalogPager) -> Arc<Mutex<CatalogPager>> {
        let pager = Arc::new(Mutex::new(pager));
        self.pagers.lock().await.insert(section, Arc::clone(&pager));
        pager
    }

    pub async fn pager(&self, section: Section) -> Option<Arc<Mutex<CatalogPager>>> {
        self.pagers.lock().await.get(&section).cloned()
    }

    async fn touch(&self) {
        *self.last_seen.lock().await = Instant::now();
    }

    async fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_seen.lock().await)
    }

    async fn dispose(&self) {
        if let Some(carousel) = self.carousel.lock().await.take() {
            carousel.dispose();
        }
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Arc<Session>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(Duration::from_secs(config.idle_timeout_secs))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Session named by the cookie, if it is still alive.
    pub async fn get(&self, cookies: &CookieJar) -> Option<Arc<Session>> {
        let id = session_id(cookies)?;
        let session = self.sessions.read().await.get(&id).cloned()?;
        session.touch().await;
        Some(session)
    }

    /// The cookie's session, or a new one with the cookie set on the returned jar.
    pub async fn resolve(&self, cookies: CookieJar) -> (CookieJar, Arc<Session>) {
        if let Some(session) = self.get(&cookies).await {
            return (cookies, session);
        }

        let id = Uuid::new_v4();
        let session = Arc::new(Session::new(id));
        self.sessions.write().await.insert(id, Arc::clone(&session));
        tracing::debug!(session = %id, "Created browsing session");

        (cookies.add(self.cookie(id)), session)
    }

    /// The cookie's session, or a throwaway one that is never stored.
    ///
    /// Fragment and JSON endpoints use this so that only full page loads mint
    /// sessions and cookies.
    pub async fn get_or_transient(&self, cookies: &CookieJar) -> Arc<Session> {
        match self.get(cookies).await {
            Some(session) => session,
            None => Arc::new(Session::new(Uuid::new_v4())),
        }
    }

    /// Drop sessions idle longer than the timeout. Returns how many were evicted.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut expired = Vec::new();

        {
            let sessions = self.sessions.read().await;
            for (id, session) in sessions.iter() {
                if session.idle_for(now).await >= self.idle_timeout {
                    expired.push(*id);
                }
            }
        }

        if expired.is_empty() {
            return 0;
        }

        let mut sessions = self.sessions.write().await;
        let mut evicted = 0;
        for id in expired {
            if let Some(session) = sessions.remove(&id) {
                session.dispose().await;
                evicted += 1;
            }
        }

        tracing::debug!(evicted, remaining = sessions.len(), "Swept idle sessions");
        evicted
    }

    /// Run [`SessionStore::sweep`] every `every` until `cancel` fires.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        store.sweep().await;
                    }
                }
            }

            tracing::debug!("Session sweeper stopped");
        })
    }

    fn cookie(&self, id: Uuid) -> Cookie<'static> {
        let max_age = i64::try_from(self.idle_timeout.as_secs()).unwrap_or(i64::MAX);
        Cookie::build((SESSION_COOKIE, id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(::time::Duration::seconds(max_age))
            .build()
    }
}

fn session_id(cookies: &CookieJar) -> Option<Uuid> {
    cookies
        .get(SESSION_COOKIE)
        .and_then(|c| Uuid::parse_str(c.value()).ok())
}
