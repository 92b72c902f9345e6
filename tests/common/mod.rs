use axum::{
    body::Body, http::{header, Request, StatusCode}, Router
};
use echoroom::{app, parse_directory, AppState, Config, CountryDirectory};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const COUNTRIES: &str = r#"[
    {"cca2": "US", "name": {"common": "United States"}, "idd": {"root": "+1", "suffixes": ["201"]}},
    {"cca2": "IN", "name": {"common": "India"}, "idd": {"root": "+9", "suffixes": ["1"]}},
    {"cca2": "AQ", "name": {"common": "Antarctica"}, "idd": {}}
]"#;

pub struct Reply {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// Drives the router like a browser would, carrying the session cookie.
pub struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    pub fn new() -> Self {
        let directory = CountryDirectory::preloaded(parse_directory(COUNTRIES).unwrap());
        Self {
            app: app(AppState::with_directory(Config::instant(), directory)),
            cookie: None,
        }
    }

    pub async fn get(&mut self, uri: &str) -> Reply {
        self.send(Request::get(uri), Body::empty()).await
    }

    pub async fn post(&mut self, uri: &str, form: &str) -> Reply {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(form.to_owned())).await
    }

    pub async fn post_with_header(&mut self, uri: &str, form: &str, name: &str, value: &str) -> Reply {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(name, value);
        self.send(request, Body::from(form.to_owned())).await
    }

    pub async fn post_multipart(&mut self, uri: &str, boundary: &str, body: Vec<u8>) -> Reply {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"));
        self.send(request, Body::from(body)).await
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> Reply {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = self.app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let set_cookie = set_cookie.to_str().unwrap();
            self.cookie = Some(set_cookie.split(';').next().unwrap().to_owned());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|l| l.to_str().unwrap().to_owned());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        Reply {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    /// Sends a code, reads it back off the page and verifies it.
    pub async fn log_in(&mut self) {
        let sent = self.post("/otp/send", "country=IN&phone=9876543210").await;
        let code = demo_code(&sent.body).expect("code shown on page");

        let verified = self.post("/otp/verify", &format!("otp={code}")).await;
        assert!(verified.body.contains("Login/Signup successful!"));
    }
}

pub fn demo_code(body: &str) -> Option<String> {
    let start = body.find("(Demo: ")? + "(Demo: ".len();
    Some(body[start..start + 6].to_owned())
}

/// Ids of the chatrooms on a dashboard page, in order.
pub fn room_ids(body: &str) -> Vec<i64> {
    body.match_indices("href=\"/dashboard/rooms/")
        .filter_map(|(at, m)| {
            let rest = &body[at + m.len()..];
            rest[..rest.find('"')?].parse().ok()
        })
        .collect()
}
