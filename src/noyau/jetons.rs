// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_rational::BigRational;

use super::erreur::ErreurNoyau;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(BigRational),
    Pi,

    // Fonctions + variables (tout ce qui n’est pas pi / opérateur / nombre)
    // NOTE: le parse (RPN) décide : suivi de '(' => appel, sinon => variable.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ^

    LPar,
    RPar,
    Virgule,

    // Jetons produits seulement par to_rpn (jamais par tokenize).
    MoinsUnaire,
    Implicite,
    Appel(String, usize),
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - entiers et décimaux (ex: 12, 0.25, .5) -> Num exact
/// - opérateurs + - * / ^ et la virgule des arguments
/// - parenthèses ( )
/// - π ou pi
/// - identifiants [a-zA-Z_][a-zA-Z0-9_]* (casse conservée : `A` et `a` sont distincts)
/// - √ (équivaut à ident("sqrt"))
pub fn tokenize(s: &str) -> Result<Vec<Tok>, ErreurNoyau> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let simple = match c {
            '(' => Some(Tok::LPar),
            ')' => Some(Tok::RPar),
            ',' => Some(Tok::Virgule),
            '+' => Some(Tok::Plus),
            '-' | '−' => Some(Tok::Minus),
            '*' | '·' | '×' => Some(Tok::Star),
            '/' | '÷' => Some(Tok::Slash),
            '^' => Some(Tok::Caret),
            'π' => Some(Tok::Pi),
            '√' => Some(Tok::Ident("sqrt".to_string())),
            _ => None,
        };
        if let Some(t) = simple {
            out.push(t);
            i += 1;
            continue;
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();

            // pi / PI / Pi : toujours la constante
            if word.eq_ignore_ascii_case("pi") {
                out.push(Tok::Pi);
            } else {
                out.push(Tok::Ident(word));
            }
            continue;
        }

        // Nombre : partie entière optionnelle, partie décimale optionnelle (au moins un chiffre)
        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let int_str: String = chars[start..i].iter().collect();

            let mut frac_str = String::new();
            if i < chars.len() && chars[i] == '.' {
                i += 1;
                let start_f = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                frac_str = chars[start_f..i].iter().collect();
            }

            let texte: String = chars[start..i].iter().collect();
            if int_str.is_empty() && frac_str.is_empty() {
                return Err(ErreurNoyau::NombreInvalide(texte));
            }

            out.push(Tok::Num(decimal_exact(&int_str, &frac_str, &texte)?));
            continue;
        }

        return Err(ErreurNoyau::CaractereInattendu(c));
    }

    Ok(out)
}

/// "12" + "05" -> 1205/100 (réduit par num_rational).
fn decimal_exact(int_str: &str, frac_str: &str, texte: &str) -> Result<BigRational, ErreurNoyau> {
    let mut chiffres = String::with_capacity(int_str.len() + frac_str.len());
    chiffres.push_str(int_str);
    chiffres.push_str(frac_str);

    let n = BigInt::parse_bytes(chiffres.as_bytes(), 10)
        .ok_or_else(|| ErreurNoyau::NombreInvalide(texte.to_string()))?;
    let d = BigInt::from(10).pow(frac_str.len() as u32);
    Ok(BigRational::new(n, d))
}
