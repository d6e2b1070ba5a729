use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FieldError;
use crate::models::{CreateUserRequest, UpdateUserRequest};

// Patterns follow the official Mexican CURP/RFC layouts. Compiled once.
static CURP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([A-Z][AEIOUX][A-Z]{2}\d{2}(?:0[1-9]|1[0-2])(?:0[1-9]|[12]\d|3[01])[HM](?:AS|B[CS]|C[CLMSH]|D[FG]|G[TR]|HG|JC|M[CNS]|N[ETL]|OC|PL|Q[TR]|S[PLR]|T[CSL]|VZ|YN|ZS)[B-DF-HJ-NP-TV-Z]{3}[A-Z\d])(\d)$",
    )
    .expect("CURP regex must compile")
});

static RFC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-ZÑ&]{3,4})\d{2}(0[1-9]|1[0-2])(0[1-9]|[12]\d|3[01])([A-Z\d]{3})$")
        .expect("RFC regex must compile")
});

// No spaces, no accented letters; punctuation allowed; never empty.
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"^[A-Za-zÑñ0-9!"#$%&'()*+,\-./:<=>?@\[\]^_`{|}~]+$"##)
        .expect("username regex must compile")
});

// Spaces and accented letters allowed; never empty. Shared by password and
// address, which accept the same character set.
static TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r##"^[A-Za-zÁÉÍÓÚÜÑáéíóúüñ0-9 !"#$%&'()*+,\-./:<=>?@\[\]^_`{|}~]+$"##)
        .expect("text regex must compile")
});

pub fn valid_curp(curp: &str) -> bool {
    CURP_RE.is_match(curp)
}

pub fn valid_cp(cp: &str) -> bool {
    cp.len() == 5 && cp.chars().all(|c| c.is_ascii_digit())
}

pub fn valid_rfc(rfc: &str) -> bool {
    RFC_RE.is_match(rfc)
}

pub fn valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit())
}

pub fn valid_birthdate(date: &str) -> bool {
    NaiveDate::parse_from_str(date, "%d-%m-%Y").is_ok()
}

pub fn valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

pub fn valid_password(password: &str) -> bool {
    TEXT_RE.is_match(password)
}

pub fn valid_address(address: &str) -> bool {
    TEXT_RE.is_match(address)
}

const REASON_CURP: &str = "does not match the official CURP format";
const REASON_CP: &str = "must be exactly 5 numeric digits";
const REASON_RFC: &str = "does not match the official RFC format";
const REASON_PHONE: &str = "must be exactly 10 numeric digits";
const REASON_BIRTHDATE: &str = "must be a valid date in dd-mm-yyyy format";
const REASON_USERNAME: &str =
    "only unaccented letters, digits and punctuation are allowed; no spaces; must not be empty";
const REASON_TEXT: &str = "contains characters outside the allowed set or is empty";
const REASON_NULL: &str = "must not be null";

/// validate_create
///
/// Runs every field predicate over a full-record payload and returns the
/// complete list of failures (empty when the payload is clean).
pub fn validate_create(req: &CreateUserRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !valid_username(&req.username) {
        errors.push(FieldError::new("username", REASON_USERNAME));
    }
    if !valid_password(&req.password) {
        errors.push(FieldError::new("password", REASON_TEXT));
    }
    if !valid_curp(&req.curp) {
        errors.push(FieldError::new("curp", REASON_CURP));
    }
    if !valid_cp(&req.cp) {
        errors.push(FieldError::new("cp", REASON_CP));
    }
    if !valid_rfc(&req.rfc) {
        errors.push(FieldError::new("rfc", REASON_RFC));
    }
    if !valid_phone(&req.phone) {
        errors.push(FieldError::new("phone", REASON_PHONE));
    }
    if !valid_birthdate(&req.birthdate) {
        errors.push(FieldError::new("birthdate", REASON_BIRTHDATE));
    }
    if !valid_address(&req.address) {
        errors.push(FieldError::new("address", REASON_TEXT));
    }
    errors
}

/// validate_patch
///
/// Validates only the fields carried by a partial update. An absent field is
/// untouched and therefore not checked; an explicit JSON null is always a
/// failure, because every record field is a required string once stored.
pub fn validate_patch(req: &UpdateUserRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    check_opt(&mut errors, "password", &req.password, valid_password, REASON_TEXT);
    if let Some(None) = req.role {
        errors.push(FieldError::new("role", REASON_NULL));
    }
    check_opt(&mut errors, "curp", &req.curp, valid_curp, REASON_CURP);
    check_opt(&mut errors, "cp", &req.cp, valid_cp, REASON_CP);
    check_opt(&mut errors, "rfc", &req.rfc, valid_rfc, REASON_RFC);
    check_opt(&mut errors, "phone", &req.phone, valid_phone, REASON_PHONE);
    check_opt(
        &mut errors,
        "birthdate",
        &req.birthdate,
        valid_birthdate,
        REASON_BIRTHDATE,
    );
    check_opt(&mut errors, "address", &req.address, valid_address, REASON_TEXT);

    errors
}

fn check_opt(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &Option<Option<String>>,
    predicate: fn(&str) -> bool,
    reason: &str,
) {
    match value {
        None => {}
        Some(None) => errors.push(FieldError::new(field, REASON_NULL)),
        Some(Some(v)) => {
            if !predicate(v) {
                errors.push(FieldError::new(field, reason));
            }
        }
    }
}
