//! Tests scientifiques (campagne) : invariants du moteur symbolique + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//! - sorties comparées en LaTeX (forme canonique)
//!
//! Notes :
//! - les angles remarquables passent par coeff·π : "pi/4 + 2*pi" est reconnu (Add de multiples de π)
//! - pas d’identités trig générales : sin²+cos² sur une variable reste tel quel

use std::time::{Duration, Instant};

use super::erreur::ErreurNoyau;
use super::symbolique::MoteurSymbolique;

const INDEFINI: &str = "\\text{indéfini}";

fn exact(expr: &str) -> String {
    MoteurSymbolique::new()
        .simplifier(expr)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
}

fn assert_exact_eq(expr: &str, attendu: &str) {
    assert_eq!(exact(expr), attendu, "expr={expr:?}");
}

fn assert_indefini(expr: &str) {
    assert_eq!(exact(expr), INDEFINI, "expr={expr:?}");
    assert_eq!(
        MoteurSymbolique::new().evaluer_numerique(expr, 6),
        Err(ErreurNoyau::ResultatIndefini),
        "lecture décimale de {expr:?}"
    );
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Invariants trig (angles spéciaux) ------------------------ */

#[test]
fn sci_indefinis_tan() {
    assert_indefini("tan(pi/2)");
    assert_indefini("tan(3*pi/2)");
    assert_indefini("tan(-pi/2)");
}

#[test]
fn sci_identites_symetrie() {
    // sin(-x) = -sin(x)
    assert_exact_eq("sin(-pi/4)", "-\\frac{\\sqrt{2}}{2}");
    assert_exact_eq("sin(pi/4)", "\\frac{\\sqrt{2}}{2}");

    // cos(-x) = cos(x)
    assert_exact_eq("cos(-pi/3)", "\\frac{1}{2}");
    assert_exact_eq("cos(pi/3)", "\\frac{1}{2}");

    // tan(-x) = -tan(x)
    assert_exact_eq("tan(-pi/6)", "-\\frac{\\sqrt{3}}{3}");
    assert_exact_eq("tan(pi/6)", "\\frac{\\sqrt{3}}{3}");
}

#[test]
fn sci_periodicite_angles() {
    assert_exact_eq("sin(9*pi/4)", "\\frac{\\sqrt{2}}{2}");
    assert_exact_eq("sin(pi/4 + 2*pi)", "\\frac{\\sqrt{2}}{2}");
    assert_exact_eq("cos(7*pi/3)", "\\frac{1}{2}");
    // tan(π + π/6) = tan(π/6)
    assert_exact_eq("tan(7*pi/6)", "\\frac{\\sqrt{3}}{3}");
}

#[test]
fn sci_propagation_indefini() {
    assert_indefini("1 + tan(pi/2)");
    assert_indefini("tan(pi/2) + 1");
    assert_indefini("2 * tan(pi/2)");
    assert_indefini("tan(pi/2) / 3");
}

/* ------------------------ Cohérence algébrique (zéro) ------------------------ */

#[test]
fn sci_zero_algebrique() {
    assert_exact_eq("(1/2 + 1/3) - 5/6", "0");
    assert_exact_eq("(2/3 * 3/4) - 1/2", "0");
    assert_exact_eq("sqrt(2)*sqrt(2) - 2", "0");
    assert_exact_eq("x - x", "0");
}

#[test]
fn sci_decimaux_exacts() {
    // la saisie décimale reste exacte
    assert_exact_eq("0.1 + 0.2", "\\frac{3}{10}");
    assert_exact_eq("(2/3)^-2", "\\frac{9}{4}");
    assert_exact_eq("2^10", "1024");
}

/* ------------------------ Lecture décimale ------------------------ */

#[test]
fn sci_lecture_decimale_coherente() {
    let m = MoteurSymbolique::new();
    assert_eq!(m.evaluer_numerique("sin(pi/4)", 6).unwrap(), "0.707107");
    assert_eq!(m.evaluer_numerique("pi", 10).unwrap(), "3.1415926536");
    assert_eq!(m.evaluer_numerique("0.1 + 0.2", 6).unwrap(), "0.3");
    assert_eq!(m.evaluer_numerique("1/0", 6).unwrap(), "\\infty");
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_profondeur_sqrt_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    // sqrt(4) -> 2 ; (2)^2 -> 4 ; … : reste rationnel à chaque étape
    let mut expr = "4".to_string();
    for k in 0..60 {
        expr = if k % 2 == 0 {
            format!("sqrt({expr})")
        } else {
            format!("({expr})^2")
        };
        budget(t0, max);
    }

    assert_exact_eq(&expr, "4");
    budget(t0, max);
}

#[test]
fn sci_stress_taille_somme_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    let termes: Vec<&str> = std::iter::repeat("1/2").take(80).collect();
    let expr = termes.join(" + ");

    // 80*(1/2) = 40
    assert_exact_eq(&expr, "40");
    budget(t0, max);
}

#[test]
fn sci_stress_bigint_safe() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    // gros numérateur contrôlé (100 chiffres)
    let big = "9".repeat(100);
    let expr = format!("{big}/7 + 1/7");

    // 10^100 / 7
    let attendu = format!("\\frac{{1{}}}{{7}}", "0".repeat(100));
    assert_exact_eq(&expr, &attendu);
    budget(t0, max);
}

#[test]
fn sci_stress_exposant_borne() {
    let t0 = Instant::now();
    let max = Duration::from_millis(200);

    // au-delà de la borne, la puissance reste symbolique au lieu de geler
    assert_exact_eq("2^100000", "2^{100000}");
    budget(t0, max);
}

#[test]
fn sci_stress_puissance_de_puissance_bornee() {
    let t0 = Instant::now();
    let max = Duration::from_millis(2000);

    // 10^4096 se plie (4097 chiffres), sa puissance 4096 reste symbolique
    let e = exact("(10^4096)^4096");
    assert!(e.ends_with("^{4096}"), "{}", &e[e.len().saturating_sub(40)..]);
    assert!(e.len() < 5000, "puissance pliée: {} caractères", e.len());
    budget(t0, max);

    let e = exact("((10^4096)^4096)^4096");
    assert!(e.ends_with("^{4096}"));
    budget(t0, max);

    // lecture décimale : ∞ ou refus, mais sans geler
    let _ = MoteurSymbolique::new().evaluer_numerique("(10^4096)^4096", 6);
    budget(t0, max);
}
