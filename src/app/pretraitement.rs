// src/app/pretraitement.rs
//
// Prétraitement de la saisie
// --------------------------
// - espaces retirés (les deux modes)
// - mode numérique seulement : `:N` remplacé par la valeur de la ligne N, arrondie ;
//   un ':' sans chiffres disparaît (`a:=3` devient `a=3`)

use log::trace;

use super::erreurs::ErreurPretraitement;
use super::etat::Mode;
use super::historique::Historique;
use crate::noyau::lecture::arrondir;

pub fn pretraiter(
    texte: &str,
    mode: Mode,
    historique: &Historique,
    precision: usize,
) -> Result<String, ErreurPretraitement> {
    let compact: String = texte.chars().filter(|c| !c.is_whitespace()).collect();
    if mode == Mode::Algebrique {
        return Ok(compact);
    }

    let mut sortie = String::with_capacity(compact.len());
    let mut it = compact.chars().peekable();

    while let Some(c) = it.next() {
        if c != ':' {
            sortie.push(c);
            continue;
        }

        let mut chiffres = String::new();
        while let Some(d) = it.next_if(|d| d.is_ascii_digit()) {
            chiffres.push(d);
        }
        if chiffres.is_empty() {
            continue;
        }

        let n: usize = chiffres
            .parse()
            .map_err(|_| ErreurPretraitement::Malformee(chiffres.clone()))?;
        let entree = historique
            .ligne(n)
            .ok_or(ErreurPretraitement::HorsBornes {
                reference: n,
                lignes: historique.len(),
            })?;
        let v = entree.valeur.ok_or(ErreurPretraitement::SansValeur(n))?;
        sortie.push_str(&valeur_litterale(v, precision));
    }

    trace!("prétraitement: {texte:?} -> {sortie:?}");
    Ok(sortie)
}

/// Texte relu par le moteur numérique comme la même valeur (∞ compris).
fn valeur_litterale(v: f64, precision: usize) -> String {
    match v {
        v if v == f64::INFINITY => "(1/0)".to_string(),
        v if v == f64::NEG_INFINITY => "(-1/0)".to_string(),
        v => arrondir(v, precision),
    }
}
