use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};
use uuid::Uuid;

use crate::Config;

pub static CART_COOKIE: &str = "cart";
const CART_MAX_AGE_DAYS: i64 = 7;

pub fn decode(value: &str) -> Vec<Uuid> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|raw| serde_json::from_slice::<Vec<Uuid>>(&raw).ok())
        .unwrap_or_default()
}

pub fn encode(ids: &[Uuid]) -> String {
    let json = serde_json::to_vec(ids).unwrap_or_else(|_| b"[]".to_vec());
    URL_SAFE_NO_PAD.encode(json)
}

pub fn read(cookies: &Cookies) -> Vec<Uuid> {
    cookies
        .get(CART_COOKIE)
        .map(|c| decode(c.value()))
        .unwrap_or_default()
}

pub async fn write(cookies: &Cookies, ids: &[Uuid]) {
    let mut cookie = Cookie::new(CART_COOKIE, encode(ids));
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_secure(Config::get_or_init(false).await.app().secure_cookies());
    cookie.set_max_age(tower_cookies::cookie::time::Duration::days(CART_MAX_AGE_DAYS));
    cookies.add(cookie);
}

pub fn clear(cookies: &Cookies) {
    let mut cookie = Cookie::from(CART_COOKIE);
    cookie.set_path("/");
    cookies.remove(cookie);
}
