use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// ISO-3166 alpha-2 country code, upper case ("IQ", "JO")
    pub static ref COUNTRY_CODE_REGEX: Regex = Regex::new(r"^[A-Z]{2}$").unwrap();

    /// ISO-4217 currency code, upper case ("IQD", "USD")
    pub static ref CURRENCY_CODE_REGEX: Regex = Regex::new(r"^[A-Z]{3}$").unwrap();
}
