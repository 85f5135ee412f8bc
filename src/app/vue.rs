// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// La vue lit `AppCalc` et n’émet que des `Evenement` ; ils sont appliqués en fin de frame.
// - Enter exécute, ↑/↓ rappellent les saisies (quand le champ a le focus)
// - aperçu recalculé à chaque frame (lecture seule)
// - historique : numéro de ligne (pour :N), rendu, bouton ✕

use eframe::egui;

use super::etat::{AppCalc, Evenement, Mode};
use super::navigation::Direction;

const AIDE: &[(&str, &str)] = &[
    ("Entrée", "exécuter la saisie"),
    ("↑ / ↓", "rappeler les saisies précédentes"),
    ("Échap", "effacer le brouillon"),
    ("Ctrl+M", "changer de mode"),
    ("F1", "afficher / masquer l’aide"),
    ("a = 2", "définir une variable (ou a := 2)"),
    ("f(x) = x^2", "définir une fonction"),
    (":N", "valeur de la ligne N (mode numérique)"),
    ("2x, 3(1+2)", "produit implicite"),
    ("sqrt sin cos tan", "intégrées (et asin, ln, exp, abs, min, max, …)"),
];

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        let mut evenements = Vec::new();

        ui.heading("Calculatrice à aperçu");
        ui.add_space(6.0);

        self.ui_barre(ui, &mut evenements);
        ui.add_space(6.0);
        self.ui_entree(ui, &mut evenements);

        if self.aide_visible {
            ui.add_space(6.0);
            Self::ui_aide(ui);
        }

        ui.add_space(8.0);
        ui.separator();
        ui.add_space(8.0);

        self.ui_historique(ui, &mut evenements);

        for ev in evenements {
            self.traiter(ev);
        }
    }

    fn ui_barre(&self, ui: &mut egui::Ui, evenements: &mut Vec<Evenement>) {
        ui.horizontal(|ui| {
            for mode in [Mode::Numerique, Mode::Algebrique] {
                if ui
                    .selectable_label(self.mode == mode, mode.libelle())
                    .on_hover_text("Ctrl+M")
                    .clicked()
                {
                    evenements.push(Evenement::ChoisirMode(mode));
                }
            }

            ui.separator();

            let mut decimal = self.decimal;
            let resp = ui.add_enabled(
                self.mode == Mode::Algebrique,
                egui::Checkbox::new(&mut decimal, "Décimal"),
            );
            if resp
                .on_hover_text("Lecture décimale plutôt que forme exacte")
                .changed()
            {
                evenements.push(Evenement::BasculerDecimal);
            }

            ui.separator();

            if ui
                .selectable_label(self.aide_visible, "?")
                .on_hover_text("Aide (F1)")
                .clicked()
            {
                evenements.push(Evenement::BasculerAide);
            }
        });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui, evenements: &mut Vec<Evenement>) {
        ui.label("Entrée :");

        let mut brouillon = self.etat().brouillon.clone();
        let indice = match self.mode {
            Mode::Numerique => "Ex: 2x+1, a = 3, :1*2",
            Mode::Algebrique => "Ex: sin(pi/4), f(x) = x^2 + 1",
        };

        // id par mode : le curseur du champ ne saute pas d’un mode à l’autre
        let resp = ui.add(
            egui::TextEdit::singleline(&mut brouillon)
                .desired_width(ui.available_width())
                .hint_text(indice)
                .id_salt(("entree", self.mode.libelle()))
                .code_editor(),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        if resp.changed() {
            evenements.push(Evenement::Saisie(brouillon));
        }

        // singleline : Enter rend le focus, d’où lost_focus
        if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            evenements.push(Evenement::Executer);
        }
        if resp.has_focus() {
            if ui.input(|i| i.key_pressed(egui::Key::ArrowUp)) {
                evenements.push(Evenement::Rappel(Direction::PlusAncien));
            }
            if ui.input(|i| i.key_pressed(egui::Key::ArrowDown)) {
                evenements.push(Evenement::Rappel(Direction::PlusRecent));
            }
        }

        ui.add_space(4.0);
        ui.label("Aperçu :");
        Self::champ_monospace(ui, "apercu_out", &self.apercu_affichable(), 1);

        ui.horizontal(|ui| {
            if ui
                .add_sized([56.0, 30.0], egui::Button::new("="))
                .on_hover_text("Exécuter (Entrée)")
                .clicked()
            {
                evenements.push(Evenement::Executer);
            }
            if ui
                .add_sized([56.0, 30.0], egui::Button::new("C"))
                .on_hover_text("Efface seulement l’entrée (Échap)")
                .clicked()
            {
                evenements.push(Evenement::EffacerBrouillon);
            }
            if ui
                .add_sized([56.0, 30.0], egui::Button::new("AC"))
                .on_hover_text("Efface l’historique et les symboles de ce mode")
                .clicked()
            {
                evenements.push(Evenement::EffacerTout);
            }
        });

        if let Some(msg) = &self.erreur {
            ui.colored_label(ui.visuals().error_fg_color, msg);
        }
    }

    fn ui_aide(ui: &mut egui::Ui) {
        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("aide_grille")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for (touche, effet) in AIDE {
                        ui.monospace(*touche);
                        ui.label(*effet);
                        ui.end_row();
                    }
                });
        });
    }

    fn ui_historique(&self, ui: &mut egui::Ui, evenements: &mut Vec<Evenement>) {
        let historique = &self.etat().historique;
        if historique.is_empty() {
            ui.weak("Historique vide");
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (i, entree) in historique.entrees().iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.monospace(format!("{:>3}:", historique.numero_ligne(i)));
                        if ui
                            .small_button("✕")
                            .on_hover_text("Supprimer cette ligne")
                            .clicked()
                        {
                            evenements.push(Evenement::Supprimer(i));
                        }
                        ui.monospace(&entree.rendu);
                    });
                }
            });
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        // Affichage lecture seule “stable”, sans TextEdit interactif.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }
}
