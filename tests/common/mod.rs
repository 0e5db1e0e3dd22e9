#![allow(dead_code)]

use std::{
    net::TcpListener,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use blogdesk::{
    client::ApiClient,
    config::{AdminSeed, Config},
    init_db, make_router,
    notifications::{Notification, Notifier},
    run_app, seed_admin,
    state::AppState,
    BlogResponse, CreateBlogRequest, RegisterRequest, UserResponse,
};
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const PASSWORD: &str = "password123";

/// Keeps every notification it is asked to send. When `failing` is set it
/// still records the attempt but reports a delivery error.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, email: &str) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|notification| notification.to == email)
            .collect()
    }
}

#[axum::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(notification);
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("mail server unavailable");
        }
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub notifier: Arc<RecordingNotifier>,
    _dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Like [`spawn_app`], with a chance to adjust the configuration first.
pub async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    blogdesk::logging::init();

    let dir = tempfile::tempdir().expect("temp dir");
    let db_url = format!("sqlite://{}", dir.path().join("blogdesk.db").display());
    let pool = init_db(&db_url).await.expect("database");

    let seed = AdminSeed {
        name: "Admin".to_string(),
        email: ADMIN_EMAIL.to_string(),
        password: ADMIN_PASSWORD.to_string(),
    };
    seed_admin(&pool, &seed).await.expect("admin seed");

    let mut config = Config::new(db_url, "integration-test-secret");
    configure(&mut config);
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::with_notifier(pool, config, notifier.clone());

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(run_app(make_router(state), listener));

    TestApp {
        address,
        notifier,
        _dir: dir,
    }
}

impl TestApp {
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.address)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn register(&self, name: &str) -> (ApiClient, UserResponse) {
        let mut client = self.client();
        let response = client
            .register(&RegisterRequest {
                name: name.to_string(),
                email: email_for(name),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("register");
        (client, response.user)
    }

    pub async fn admin(&self) -> ApiClient {
        let mut client = self.client();
        client
            .login(&blogdesk::LoginRequest {
                email: ADMIN_EMAIL.to_string(),
                password: ADMIN_PASSWORD.to_string(),
            })
            .await
            .expect("admin login");
        client
    }

    /// Creates a blog as `author` and has the admin approve it.
    pub async fn publish(&self, author: &ApiClient, title: &str) -> BlogResponse {
        let blog = author
            .create_blog(&blog_request(title))
            .await
            .expect("create blog")
            .data;
        self.admin()
            .await
            .approve_blog(blog.id)
            .await
            .expect("approve")
            .data
    }
}

pub fn email_for(name: &str) -> String {
    format!("{}@example.com", name.to_lowercase())
}

pub fn blog_request(title: &str) -> CreateBlogRequest {
    CreateBlogRequest {
        title: title.to_string(),
        content: format!("{title} body text that is long enough to read"),
        excerpt: format!("About {title}"),
        cover_image: None,
        tags: vec!["rust".to_string()],
    }
}
