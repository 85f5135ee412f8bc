// src/noyau/lecture.rs
//
// Lecture décimale : un flottant arrondi à `decimales` chiffres, sans zéros inutiles.
// Sert à l’affichage des résultats, aux références de ligne (:N) et au mode décimal algébrique.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// Garde-fou : au-delà, f64 n’a plus de chiffres significatifs à offrir.
pub const DECIMALES_MAX: usize = 15;

/// Arrondi “au plus proche” à `decimales` chiffres, puis texte compact :
/// 2.000000 -> "2", 0.3333333 -> "0.333333", -0.0000001 -> "0".
pub fn arrondir(v: f64, decimales: usize) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let d = decimales.min(DECIMALES_MAX);
    let mut s = format!("{v:.d$}");

    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }

    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Même lecture pour un rationnel exact (le noyau symbolique garde des rationnels).
pub fn arrondir_rationnel(r: &BigRational, decimales: usize) -> String {
    if r.denom() == &BigInt::from(1) {
        return r.numer().to_string();
    }

    // Arrondi exact : round(r * 10^d) / 10^d, sans passer par f64.
    let d = decimales.min(DECIMALES_MAX);
    let echelle = BigInt::from(10).pow(d as u32);
    let scaled = (r * BigRational::from_integer(echelle)).round().to_integer();

    let neg = scaled.is_negative();
    let abs = scaled.abs();
    let mut chiffres = abs.to_str_radix(10);
    while chiffres.len() <= d {
        chiffres.insert(0, '0');
    }
    let (ent, frac) = chiffres.split_at(chiffres.len() - d);
    let frac = frac.trim_end_matches('0');

    let mut s = String::new();
    if neg && !abs.is_zero() {
        s.push('-');
    }
    s.push_str(ent);
    if !frac.is_empty() {
        s.push('.');
        s.push_str(frac);
    }
    s
}

/// Conversion rationnel -> f64 (NaN si hors domaine, ne panique jamais).
pub fn rationnel_vers_f64(r: &BigRational) -> f64 {
    r.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn arrondi_compact() {
        assert_eq!(arrondir(2.0, 6), "2");
        assert_eq!(arrondir(1.0 / 3.0, 6), "0.333333");
        assert_eq!(arrondir(2.0 / 3.0, 6), "0.666667");
        assert_eq!(arrondir(-1e-9, 6), "0");
        assert_eq!(arrondir(12.6, 0), "13");
    }

    #[test]
    fn arrondi_valeurs_speciales() {
        assert_eq!(arrondir(f64::INFINITY, 6), "Infinity");
        assert_eq!(arrondir(f64::NAN, 6), "NaN");
    }

    #[test]
    fn arrondi_rationnel_exact() {
        assert_eq!(arrondir_rationnel(&q(1, 3), 6), "0.333333");
        assert_eq!(arrondir_rationnel(&q(-2, 3), 4), "-0.6667");
        assert_eq!(arrondir_rationnel(&q(1, 8), 2), "0.13");
        assert_eq!(arrondir_rationnel(&q(7, 1), 2), "7");
        assert_eq!(arrondir_rationnel(&q(-1, 1000), 2), "0");
        assert_eq!(arrondir_rationnel(&q(5, 2), 0), "3");
    }
}
