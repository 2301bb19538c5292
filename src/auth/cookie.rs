//! The private cookie pair that represents a logged-in session.
//!
//! A session is two encrypted cookies: one holding the user's ID and one
//! holding the expiry date-time as text. The expiry cookie exists so the
//! server can check whether a session is still live without trusting the
//! client-controlled `Expires` attribute, and so the middleware can slide
//! the expiry forward while the user stays active.

use std::{cmp::max, num::ParseIntError};

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{
    Duration, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{Error, UserID};

pub(crate) const COOKIE_USER_ID: &str = "user_id";
pub(crate) const COOKIE_EXPIRY: &str = "expiry";
/// How long a session stays valid without activity.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// The format of the expiry cookie's value,
/// e.g. "2026-08-23 14:30:00.000000 +00:00:00".
///
/// The value is always produced with `format` rather than `to_string`:
/// `to_string` prints single-digit hours around midnight, which this format
/// would then refuse to parse back.
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

/// Build one half of the session cookie pair with the attributes every auth
/// cookie carries.
fn session_cookie(name: &'static str, value: String, expires: OffsetDateTime) -> Cookie<'static> {
    Cookie::build((name, value))
        .expires(expires)
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(true)
        .build()
}

/// Add the session cookie pair for `user_id` to the jar, expiring `duration`
/// from now.
///
/// # Errors
///
/// Returns a [time::error::Format] if the expiry date-time cannot be written
/// in the cookie format.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserID,
    duration: Duration,
) -> Result<PrivateCookieJar, time::error::Format> {
    let expiry = OffsetDateTime::now_utc() + duration;
    let expiry_string = expiry.format(DATE_TIME_FORMAT)?;

    Ok(jar
        .add(session_cookie(
            COOKIE_USER_ID,
            user_id.as_i64().to_string(),
            expiry,
        ))
        .add(session_cookie(COOKIE_EXPIRY, expiry_string, expiry)))
}

/// Replace the session cookie pair with already-expired cookies so the
/// client deletes them.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    let mut jar = jar;

    for name in [COOKIE_USER_ID, COOKIE_EXPIRY] {
        let mut cookie = session_cookie(name, "deleted".to_string(), OffsetDateTime::UNIX_EPOCH);
        cookie.set_max_age(Duration::ZERO);
        jar = jar.add(cookie);
    }

    jar
}

/// Push the session expiry out to `duration` from now, unless the stored
/// expiry is already later than that.
///
/// Both cookies get the new `Expires` attribute and the expiry cookie's
/// value is rewritten to match.
///
/// # Errors
///
/// The jar is returned unmodified inside the error when anything fails.
///
/// Returns:
/// - [Error::CookieMissing] if either session cookie is absent.
/// - [Error::InvalidDateFormat] if the stored expiry cannot be parsed, if
///   adding `duration` to now overflows, or if the new expiry cannot be
///   formatted.
pub(crate) fn extend_auth_cookie_duration_if_needed(
    jar: PrivateCookieJar,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let mut user_id_cookie = jar.get(COOKIE_USER_ID).ok_or(Error::CookieMissing)?;
    let mut expiry_cookie = jar.get(COOKIE_EXPIRY).ok_or(Error::CookieMissing)?;

    let current_expiry = extract_date_time(&expiry_cookie).map_err(|error| {
        Error::InvalidDateFormat(error.to_string(), expiry_cookie.value_trimmed().to_string())
    })?;

    let refreshed_expiry = OffsetDateTime::now_utc()
        .checked_add(duration)
        .ok_or_else(|| {
            Error::InvalidDateFormat("date time overflow".to_string(), duration.to_string())
        })?;

    let expiry = max(current_expiry, refreshed_expiry);
    let expiry_string = expiry
        .format(DATE_TIME_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), expiry.to_string()))?;

    user_id_cookie.set_expires(expiry);
    expiry_cookie.set_expires(expiry);
    expiry_cookie.set_value(expiry_string);

    Ok(jar.add(user_id_cookie).add(expiry_cookie))
}

/// The user ID stored in the session cookie, if the cookie is present and
/// holds a well-formed ID.
pub(crate) fn get_user_id_from_auth_cookie(jar: &PrivateCookieJar) -> Result<UserID, Error> {
    jar.get(COOKIE_USER_ID)
        .ok_or(Error::InvalidCredentials)
        .and_then(|cookie| extract_user_id(&cookie).map_err(|_| Error::InvalidCredentials))
}

/// Parse the expiry cookie's value as a date-time.
pub(crate) fn extract_date_time(cookie: &Cookie) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(cookie.value_trimmed(), DATE_TIME_FORMAT)
}

fn extract_user_id(cookie: &Cookie) -> Result<UserID, ParseIntError> {
    cookie.value_trimmed().parse().map(UserID::new)
}

#[cfg(test)]
mod auth_cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use sha2::{Digest, Sha512};
    use time::{Duration, OffsetDateTime, UtcOffset, macros::datetime};

    use crate::{Error, UserID};

    use super::{
        COOKIE_EXPIRY, COOKIE_USER_ID, DATE_TIME_FORMAT, DEFAULT_COOKIE_DURATION,
        extend_auth_cookie_duration_if_needed, extract_date_time, get_user_id_from_auth_cookie,
        invalidate_auth_cookie, set_auth_cookie,
    };

    fn empty_jar() -> PrivateCookieJar {
        let hash = Sha512::digest("fintrack cookie secret");

        PrivateCookieJar::new(Key::from(&hash))
    }

    fn logged_in_jar(user_id: UserID) -> PrivateCookieJar {
        set_auth_cookie(empty_jar(), user_id, DEFAULT_COOKIE_DURATION)
            .expect("Could not set auth cookies")
    }

    /// The expiry moves with the wall clock during the test, so compare with
    /// a one second tolerance.
    #[track_caller]
    fn assert_expiry_close_to(got: OffsetDateTime, want: OffsetDateTime) {
        assert!(
            (got - want).abs() < Duration::seconds(1),
            "expiry was {got:?}, want about {want:?}"
        );
    }

    #[test]
    fn set_auth_cookie_stores_the_user_id() {
        let jar = logged_in_jar(UserID::new(7));

        assert_eq!(get_user_id_from_auth_cookie(&jar), Ok(UserID::new(7)));
    }

    #[test]
    fn set_auth_cookie_stores_matching_expiry_value() {
        let jar = logged_in_jar(UserID::new(7));

        let expiry_cookie = jar.get(COOKIE_EXPIRY).unwrap();
        let stored_expiry = extract_date_time(&expiry_cookie).unwrap();

        assert_expiry_close_to(
            stored_expiry,
            OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION,
        );
        assert_eq!(expiry_cookie.expires_datetime(), Some(stored_expiry));
    }

    #[test]
    fn session_cookies_are_locked_down() {
        let jar = logged_in_jar(UserID::new(7));

        for name in [COOKIE_USER_ID, COOKIE_EXPIRY] {
            let cookie = jar.get(name).unwrap();

            assert_eq!(cookie.http_only(), Some(true));
            assert_eq!(cookie.secure(), Some(true));
            assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        }
    }

    #[test]
    fn expiry_format_survives_midnight() {
        // `OffsetDateTime::to_string` prints "0:00:00" at midnight, which
        // the cookie format cannot parse. Formatting must round-trip.
        let midnight = datetime!(2026-01-01 00:00:00).assume_offset(UtcOffset::UTC);
        let formatted = midnight.format(DATE_TIME_FORMAT).unwrap();
        let cookie = Cookie::build((COOKIE_EXPIRY, formatted)).build();

        assert_eq!(extract_date_time(&cookie).unwrap(), midnight);
    }

    #[test]
    fn get_user_id_fails_without_cookies() {
        assert_eq!(
            get_user_id_from_auth_cookie(&empty_jar()),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn get_user_id_fails_with_garbage_value() {
        let jar = empty_jar().add(Cookie::build((COOKIE_USER_ID, "not a number")).build());

        assert_eq!(
            get_user_id_from_auth_cookie(&jar),
            Err(Error::InvalidCredentials)
        );
    }

    #[test]
    fn extend_pushes_expiry_forward_for_longer_duration() {
        let jar = logged_in_jar(UserID::new(7));

        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::minutes(30)).unwrap();

        let want = OffsetDateTime::now_utc() + Duration::minutes(30);
        let expiry_cookie = jar.get(COOKIE_EXPIRY).unwrap();
        assert_expiry_close_to(extract_date_time(&expiry_cookie).unwrap(), want);
        assert_expiry_close_to(expiry_cookie.expires_datetime().unwrap(), want);
        assert_expiry_close_to(
            jar.get(COOKIE_USER_ID).unwrap().expires_datetime().unwrap(),
            want,
        );
    }

    #[test]
    fn extend_keeps_later_stored_expiry() {
        let jar = logged_in_jar(UserID::new(7));
        let stored = jar
            .get(COOKIE_USER_ID)
            .unwrap()
            .expires_datetime()
            .unwrap();

        // The session already has five minutes left, so a five second
        // extension changes nothing.
        let jar = extend_auth_cookie_duration_if_needed(jar, Duration::seconds(5)).unwrap();

        assert_eq!(
            jar.get(COOKIE_USER_ID).unwrap().expires_datetime(),
            Some(stored)
        );
    }

    #[test]
    fn extend_fails_without_cookies() {
        let result = extend_auth_cookie_duration_if_needed(empty_jar(), DEFAULT_COOKIE_DURATION);

        assert_eq!(result.map(|_| ()), Err(Error::CookieMissing));
    }

    #[test]
    fn invalidate_expires_both_cookies() {
        let jar = invalidate_auth_cookie(logged_in_jar(UserID::new(7)));

        for name in [COOKIE_USER_ID, COOKIE_EXPIRY] {
            let cookie = jar.get(name).unwrap();

            assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        }

        assert_eq!(
            get_user_id_from_auth_cookie(&jar),
            Err(Error::InvalidCredentials)
        );
    }
}
