// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global du convertisseur de devises
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Encapsulation : toute mutation passe par les méthodes de App
//
// PATTERN : Cette structure suit le pattern "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - La table des taux, la garde de fetch et les timers de debounce sont
//   des champs de App, jamais des globales
// - Le fetch lui-même se fait ailleurs (worker) ; son résultat est
//   réinjecté via apply_rates / fetch_failed, ce qui rend le contrôleur
//   testable sans réseau
// ============================================================================

use std::mem;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::models::{
    format_amount, format_rate, parse_amount, popular_codes, popular_position,
    round_five_digits, RateTable, POPULAR_CURRENCIES,
};

/// Devise de base par défaut (côté "from")
pub const FIRST_DEFAULT_CURRENCY: &str = "USD";

/// Devise cible par défaut (côté "to")
pub const SECOND_DEFAULT_CURRENCY: &str = "RUB";

/// Délai de debounce avant recalcul après une frappe
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(100);

/// Placeholder affiché tant que le taux demandé n'est pas connu
pub const LOADING_PLACEHOLDER: &str = "Chargement…";

// ============================================================================
// Enums : Side, Focus, Screen
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul écran actif, un seul champ focalisé à la fois
// - Le compilateur force à gérer tous les cas (exhaustivité)
// ============================================================================

/// Les deux côtés de la paire de conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// La devise de base (celle du fetch)
    From,
    /// La devise cible
    To,
}

/// Zone de l'écran convertisseur qui reçoit le clavier
///
/// CONCEPT : Focus explicite
/// - Un champ focalisé n'est jamais écrasé par un recalcul venant de
///   l'autre côté : le texte sous le curseur reste celui que
///   l'utilisateur vient de taper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Champ montant du côté "from"
    FromAmount,
    /// Champ montant du côté "to"
    ToAmount,
    /// La rangée de puces des devises populaires
    Chips,
}

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : le convertisseur
    Converter,

    /// Sélecteur modal de devise pour un côté de la paire
    /// CONCEPT : Modal picker
    /// - Capture les touches pour naviguer dans la liste des codes
    /// - Enter valide, ESC annule
    Picker { side: Side },
}

// ============================================================================
// Structure : Debounce
// ============================================================================
// Timer à échéance, un par champ de saisie
//
// CONCEPT : Debounce par deadline
// - trigger() repousse l'échéance à now + delay (chaque frappe repart
//   de zéro)
// - fire() rend true une seule fois, quand l'échéance est passée
// - Deux instances indépendantes : éditer un champ ne remet jamais à
//   zéro le timer de l'autre
// ============================================================================

/// Timer de debounce réarmable
#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    /// Crée un timer désarmé
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arme (ou réarme) le timer : l'échéance devient now + delay
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Consomme l'échéance si elle est passée
    ///
    /// CONCEPT RUST : Pattern matching avec guard
    /// - true une seule fois par armement, puis le timer retombe désarmé
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Désarme sans déclencher
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Vrai si une échéance est en attente
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

// ============================================================================
// Structure : App
// ============================================================================

/// État principal de l'application : le contrôleur du convertisseur
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Écran actuellement affiché
    /// CONCEPT RUST : Enum pour state management
    /// - Screen::Converter : la vue principale
    /// - Screen::Picker : sélecteur de devise modal
    /// - Un seul écran actif à la fois (state machine)
    pub screen: Screen,

    /// Zone qui reçoit le clavier sur l'écran convertisseur
    pub focus: Focus,

    /// La table des taux courante, exprimée dans la base from_code
    /// Remplacée en bloc par apply_rates, jamais entrée par entrée
    pub rates: RateTable,

    /// Devise de base sélectionnée (côté "from")
    pub from_code: String,

    /// Devise cible sélectionnée (côté "to")
    pub to_code: String,

    /// Texte du champ montant "from" (ce que l'utilisateur voit)
    pub from_input: String,

    /// Texte du champ montant "to"
    pub to_input: String,

    /// Dernier côté édité : détermine le sens du recalcul quand la table
    /// change (from édité : to = from * taux ; to édité : from = to / taux)
    pub last_edited: Side,

    /// Indique si un fetch de taux est en cours
    /// CONCEPT : Garde anti-chevauchement
    /// - Tant que le drapeau est levé, tout nouveau déclencheur de fetch
    ///   est abandonné, pas mis en file
    pub is_updating: bool,

    /// Puce actuellement surlignée au clavier (pas forcément active)
    pub chip_cursor: usize,

    /// Ligne sélectionnée dans le sélecteur modal
    pub picker_index: usize,

    /// Indique si l'utilisateur a demandé à quitter (attend confirmation)
    /// CONCEPT : Two-step quit pour éviter les sorties accidentelles
    /// - Première pression de 'q' : confirm_quit = true
    /// - Deuxième pression de 'q' : running = false (quit réel)
    /// - N'importe quelle autre touche : confirm_quit = false (annulation)
    pub confirm_quit: bool,

    // Timers de debounce, un par champ, volontairement indépendants
    from_debounce: Debounce,
    to_debounce: Debounce,
}

impl App {
    /// Crée l'état initial, table vide (avant le premier fetch)
    ///
    /// CONCEPT RUST : Constructor pattern
    /// - Convention : fonction associée nommée "new()"
    /// - Retourne Self (alias pour le type App)
    pub fn new() -> Self {
        Self {
            running: true,
            screen: Screen::Converter,
            focus: Focus::FromAmount,
            rates: RateTable::empty(FIRST_DEFAULT_CURRENCY),
            from_code: FIRST_DEFAULT_CURRENCY.to_string(),
            to_code: SECOND_DEFAULT_CURRENCY.to_string(),
            from_input: "1".to_string(),
            to_input: String::new(),
            last_edited: Side::From,
            is_updating: false,
            chip_cursor: popular_position(FIRST_DEFAULT_CURRENCY).unwrap_or(0),
            picker_index: 0,
            confirm_quit: false,
            from_debounce: Debounce::new(DEBOUNCE_DELAY),
            to_debounce: Debounce::new(DEBOUNCE_DELAY),
        }
    }

    /// Crée une App avec une table déjà chargée (fetch initial réussi)
    pub fn with_table(table: RateTable) -> Self {
        let mut app = Self::new();
        app.rates = table;
        app.recompute_dependent();
        app
    }

    // ========================================================================
    // Cycle de vie
    // ========================================================================

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    /// Tick : appelé à chaque itération de la boucle
    ///
    /// CONCEPT : Event Loop Pattern
    /// - C'est ici que les échéances de debounce se résolvent : au plus
    ///   un recalcul par champ et par échéance, jamais un par frappe
    pub fn tick(&mut self, now: Instant) {
        if self.from_debounce.fire(now) {
            self.recompute_to();
        }
        if self.to_debounce.fire(now) {
            self.recompute_from();
        }
    }

    // ========================================================================
    // Saisie des montants (synchronisation bidirectionnelle)
    // ========================================================================

    /// Ajoute un caractère au champ montant focalisé
    ///
    /// Marque le côté comme dernier édité et arme son timer de debounce ;
    /// le recalcul effectif attend l'échéance (voir tick)
    pub fn edit_char(&mut self, c: char, now: Instant) {
        match self.focus {
            Focus::FromAmount => {
                self.from_input.push(c);
                self.last_edited = Side::From;
                self.from_debounce.trigger(now);
            }
            Focus::ToAmount => {
                self.to_input.push(c);
                self.last_edited = Side::To;
                self.to_debounce.trigger(now);
            }
            Focus::Chips => {}
        }
    }

    /// Supprime le dernier caractère du champ montant focalisé
    pub fn edit_backspace(&mut self, now: Instant) {
        match self.focus {
            Focus::FromAmount => {
                self.from_input.pop();
                self.last_edited = Side::From;
                self.from_debounce.trigger(now);
            }
            Focus::ToAmount => {
                self.to_input.pop();
                self.last_edited = Side::To;
                self.to_debounce.trigger(now);
            }
            Focus::Chips => {}
        }
    }

    /// Recalcule to = from * taux
    ///
    /// Cas limites (aucun ne produit NaN) :
    /// - taux inconnu (table pas encore chargée) : recalcul sauté
    /// - montant invalide : coercé à 0, le champ dépendant affiche 0
    /// - champ "to" focalisé : jamais écrasé pendant que l'utilisateur
    ///   y tape (le recalcul est sauté, pas différé)
    fn recompute_to(&mut self) {
        let Some(rate) = self.usable_rate() else {
            debug!(to = %self.to_code, "Rate not available, skipping recompute");
            return;
        };

        let value = parse_amount(&self.from_input);
        let result = round_five_digits(value * rate);

        if self.focus != Focus::ToAmount {
            self.to_input = format_amount(result);
        }
    }

    /// Recalcule from = to / taux (sens inverse)
    fn recompute_from(&mut self) {
        let Some(rate) = self.usable_rate() else {
            debug!(to = %self.to_code, "Rate not available, skipping recompute");
            return;
        };

        let value = parse_amount(&self.to_input);
        let result = round_five_digits(value / rate);

        if self.focus != Focus::FromAmount {
            self.from_input = format_amount(result);
        }
    }

    /// Recalcule le champ dépendant dans le sens du dernier côté édité
    fn recompute_dependent(&mut self) {
        match self.last_edited {
            Side::From => self.recompute_to(),
            Side::To => self.recompute_from(),
        }
    }

    /// Taux exploitable vers to_code : présent, fini et non nul
    ///
    /// Un taux à 0 rendrait la division infinie ; on le traite comme absent
    fn usable_rate(&self) -> Option<f64> {
        self.rates
            .rate(&self.to_code)
            .filter(|r| r.is_finite() && *r != 0.0)
    }

    // ========================================================================
    // Fetch : garde et réinjection du résultat
    // ========================================================================

    /// Demande un rafraîchissement des taux pour la base courante
    ///
    /// CONCEPT : Garde anti-chevauchement
    /// - Retourne Some(base) et lève le drapeau si aucun fetch n'est en
    ///   cours ; l'appelant envoie alors la commande au worker
    /// - Retourne None si un fetch est déjà en vol : le déclencheur est
    ///   abandonné, pas mis en file
    pub fn request_refresh(&mut self) -> Option<String> {
        if self.is_updating {
            debug!(base = %self.from_code, "Fetch already in flight, trigger dropped");
            return None;
        }
        self.is_updating = true;
        Some(self.from_code.clone())
    }

    /// Remplace la table en bloc après un fetch réussi
    ///
    /// Une seule affectation : aucun état intermédiaire n'est visible.
    /// Le champ dépendant est ensuite recalculé dans le sens du dernier
    /// côté édité.
    pub fn apply_rates(&mut self, table: RateTable) {
        info!(base = %table.base, currencies = table.len(), "Applying new rate table");
        self.rates = table;
        self.is_updating = false;
        self.recompute_dependent();
    }

    /// Acte l'échec d'un fetch : la table précédente reste affichée
    pub fn fetch_failed(&mut self) {
        self.is_updating = false;
    }

    // ========================================================================
    // Sélection des devises et swap
    // ========================================================================

    /// Change la devise de base
    ///
    /// L'appelant doit ensuite déclencher un fetch (request_refresh)
    /// puisque la table est exprimée dans la base
    pub fn set_from(&mut self, code: &str) {
        self.from_code = code.to_string();
        // Aligne le surlignage des puces sur la nouvelle base si possible
        if let Some(index) = popular_position(code) {
            self.chip_cursor = index;
        }
    }

    /// Change la devise cible : aucun fetch nécessaire (la table est déjà
    /// exprimée dans la base), seul le champ dépendant est recalculé
    pub fn set_to(&mut self, code: &str) {
        self.to_code = code.to_string();
        self.recompute_dependent();
    }

    /// Échange les deux devises sélectionnées, en une seule opération
    ///
    /// Retourne false (sans rien échanger) si un fetch est en cours : le
    /// swap relance un fetch, donc il est soumis à la même garde. Après
    /// un swap réussi l'appelant déclenche le fetch avec la nouvelle base.
    pub fn swap(&mut self) -> bool {
        if self.is_updating {
            debug!("Swap ignored while a fetch is in flight");
            return false;
        }
        mem::swap(&mut self.from_code, &mut self.to_code);
        if let Some(index) = popular_position(&self.from_code) {
            self.chip_cursor = index;
        }
        info!(from = %self.from_code, to = %self.to_code, "Swapped currency pair");
        true
    }

    // ========================================================================
    // Puces des devises populaires
    // ========================================================================

    /// Une puce est active ssi son code est la base courante
    ///
    /// CONCEPT : État dérivé
    /// - L'exclusivité mutuelle est structurelle : une seule base, donc
    ///   au plus une puce active, sans liste d'états à synchroniser
    pub fn chip_is_active(&self, code: &str) -> bool {
        self.from_code == code
    }

    /// Déplace le surlignage des puces vers la gauche
    ///
    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() : soustrait mais ne descend pas en dessous de 0
    pub fn chip_left(&mut self) {
        self.chip_cursor = self.chip_cursor.saturating_sub(1);
    }

    /// Déplace le surlignage des puces vers la droite
    pub fn chip_right(&mut self) {
        let max_index = POPULAR_CURRENCIES.len().saturating_sub(1);
        self.chip_cursor = (self.chip_cursor + 1).min(max_index);
    }

    /// Active une puce : sa devise devient la base
    ///
    /// Retourne true si l'activation a eu lieu ; l'appelant déclenche
    /// alors le fetch. Ignoré pendant un fetch en cours (même garde que
    /// le swap).
    pub fn activate_chip(&mut self, index: usize) -> bool {
        if self.is_updating {
            debug!(index, "Chip activation ignored while a fetch is in flight");
            return false;
        }
        let Some(currency) = POPULAR_CURRENCIES.get(index) else {
            return false;
        };
        self.chip_cursor = index;
        self.set_from(currency.code);
        info!(code = %currency.code, "Chip activated");
        true
    }

    // ========================================================================
    // Sélecteur modal de devise
    // ========================================================================

    /// Codes proposés par le sélecteur : la table si elle est chargée,
    /// sinon la liste des devises populaires en secours
    pub fn picker_codes(&self) -> Vec<String> {
        if self.rates.is_empty() {
            popular_codes()
        } else {
            self.rates.codes_sorted()
        }
    }

    /// Ouvre le sélecteur pour un côté, positionné sur le code actuel
    pub fn open_picker(&mut self, side: Side) {
        let current = match side {
            Side::From => &self.from_code,
            Side::To => &self.to_code,
        };
        self.picker_index = self
            .picker_codes()
            .iter()
            .position(|code| code == current)
            .unwrap_or(0);
        self.screen = Screen::Picker { side };
    }

    /// Monte d'une ligne dans le sélecteur
    pub fn picker_up(&mut self) {
        self.picker_index = self.picker_index.saturating_sub(1);
    }

    /// Descend d'une ligne dans le sélecteur
    pub fn picker_down(&mut self) {
        let max_index = self.picker_codes().len().saturating_sub(1);
        self.picker_index = (self.picker_index + 1).min(max_index);
    }

    /// Ferme le sélecteur sans rien changer
    pub fn cancel_picker(&mut self) {
        self.screen = Screen::Converter;
    }

    /// Valide la ligne sélectionnée et retourne le côté modifié
    ///
    /// Côté From : l'appelant doit déclencher un fetch (nouvelle base).
    /// Côté To : le champ dépendant est recalculé, sans fetch.
    /// La sélection s'applique toujours, même pendant un fetch en vol ;
    /// seul le fetch qui suivrait reste soumis à la garde.
    pub fn confirm_picker(&mut self) -> Option<Side> {
        let Screen::Picker { side } = self.screen else {
            return None;
        };
        let code = self.picker_codes().get(self.picker_index).cloned()?;

        match side {
            Side::From => self.set_from(&code),
            Side::To => self.set_to(&code),
        }
        self.screen = Screen::Converter;
        Some(side)
    }

    /// Vérifie si le sélecteur est ouvert
    pub fn is_picking(&self) -> bool {
        matches!(self.screen, Screen::Picker { .. })
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// Fixe la zone qui reçoit le clavier (Tab ou clic souris)
    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    /// Passe à la zone suivante : from -> to -> puces -> from
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::FromAmount => Focus::ToAmount,
            Focus::ToAmount => Focus::Chips,
            Focus::Chips => Focus::FromAmount,
        };
    }

    // ========================================================================
    // Lecture pour le rendu
    // ========================================================================

    /// La ligne de comparaison : "1 USD = 90,00 RUB"
    ///
    /// Fonction pure de l'état : deux appels sans changement d'état
    /// donnent exactement la même chaîne. Si le taux cible n'est pas
    /// exploitable, le placeholder de chargement est rendu à la place,
    /// comme pour les recalculs.
    pub fn comparison_line(&self) -> String {
        match self.usable_rate() {
            Some(rate) => format!(
                "1 {} = {} {}",
                self.from_code,
                format_rate(rate),
                self.to_code
            ),
            None => LOADING_PLACEHOLDER.to_string(),
        }
    }
}

// ============================================================================
// Trait Default
// ============================================================================
// Convention Rust : si new() ne prend pas de paramètres, implémenter Default
// ============================================================================

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Table de test : base USD, les valeurs du scénario de référence
    fn usd_table() -> RateTable {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), 1.0);
        rates.insert("RUB".to_string(), 90.0);
        rates.insert("EUR".to_string(), 0.92);
        RateTable::new("USD", rates, None)
    }

    /// Table inverse : base RUB (pour le scénario de swap)
    fn rub_table() -> RateTable {
        let mut rates = HashMap::new();
        rates.insert("RUB".to_string(), 1.0);
        rates.insert("USD".to_string(), 1.0 / 90.0);
        rates.insert("EUR".to_string(), 0.92 / 90.0);
        RateTable::new("RUB", rates, None)
    }

    /// Vide le champ from puis y tape un texte, frappe par frappe
    fn type_into_from(app: &mut App, text: &str, now: Instant) {
        app.set_focus(Focus::FromAmount);
        while !app.from_input.is_empty() {
            app.edit_backspace(now);
        }
        for c in text.chars() {
            app.edit_char(c, now);
        }
    }

    /// Idem pour le champ to
    fn type_into_to(app: &mut App, text: &str, now: Instant) {
        app.set_focus(Focus::ToAmount);
        while !app.to_input.is_empty() {
            app.edit_backspace(now);
        }
        for c in text.chars() {
            app.edit_char(c, now);
        }
    }

    #[test]
    fn test_initial_state() {
        let app = App::with_table(usd_table());
        assert!(app.is_running());
        assert_eq!(app.from_code, "USD");
        assert_eq!(app.to_code, "RUB");
        assert_eq!(app.from_input, "1");
        // Le champ dépendant est calculé dès la construction
        assert_eq!(app.to_input, "90");
        assert!(!app.is_updating);
    }

    #[test]
    fn test_edit_from_recomputes_to_after_debounce() {
        let mut app = App::with_table(usd_table());
        let t0 = Instant::now();

        type_into_from(&mut app, "10", t0);

        // Avant l'échéance : rien ne bouge
        app.tick(t0);
        assert_eq!(app.to_input, "90");

        // Après l'échéance : to = 10 * 90
        app.tick(t0 + DEBOUNCE_DELAY);
        assert_eq!(app.to_input, "900");
    }

    #[test]
    fn test_edit_to_recomputes_from() {
        let mut app = App::with_table(usd_table());
        let t0 = Instant::now();

        type_into_to(&mut app, "450", t0);
        app.tick(t0 + DEBOUNCE_DELAY);

        // from = 450 / 90
        assert_eq!(app.from_input, "5");
        assert_eq!(app.last_edited, Side::To);
    }

    #[test]
    fn test_round_trip_conversion() {
        // Convertir puis reconvertir doit retomber sur le montant initial
        // à 1e-5 relatif près (arrondi à 5 décimales)
        let mut app = App::with_table(usd_table());
        let t0 = Instant::now();

        app.set_to("EUR");
        type_into_from(&mut app, "123.456", t0);
        app.tick(t0 + DEBOUNCE_DELAY);
        let converted = parse_amount(&app.to_input);
        assert!(converted > 0.0);

        // Sens inverse : on retape le montant converti côté to
        let text = app.to_input.clone();
        type_into_to(&mut app, &text, t0);
        app.tick(t0 + 2 * DEBOUNCE_DELAY);

        let back = parse_amount(&app.from_input);
        let relative = (back - 123.456_f64).abs() / 123.456_f64;
        assert!(relative <= 1e-5, "erreur relative {} trop grande", relative);
    }

    #[test]
    fn test_comparison_line_idempotent() {
        let app = App::with_table(usd_table());
        let first = app.comparison_line();
        let second = app.comparison_line();
        assert_eq!(first, "1 USD = 90,00 RUB");
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_rate_shows_placeholder() {
        let mut app = App::with_table(usd_table());
        app.set_to("GBP"); // absent de la table
        assert_eq!(app.comparison_line(), LOADING_PLACEHOLDER);

        // Et le recalcul est sauté : pas de NaN, pas d'écrasement
        let t0 = Instant::now();
        let before = app.to_input.clone();
        type_into_from(&mut app, "10", t0);
        app.tick(t0 + DEBOUNCE_DELAY);
        assert_eq!(app.to_input, before);
    }

    #[test]
    fn test_empty_table_placeholder() {
        let app = App::new();
        assert_eq!(app.comparison_line(), LOADING_PLACEHOLDER);
    }

    #[test]
    fn test_focus_preservation() {
        let mut app = App::with_table(usd_table());
        let t0 = Instant::now();

        // L'utilisateur édite from puis passe le focus sur to avant
        // l'échéance du debounce
        type_into_from(&mut app, "10", t0);
        app.set_focus(Focus::ToAmount);
        app.tick(t0 + DEBOUNCE_DELAY);

        // Le champ focalisé n'est jamais écrasé par le recalcul croisé
        assert_eq!(app.to_input, "90");
    }

    #[test]
    fn test_invalid_amount_coerced_to_zero() {
        let mut app = App::with_table(usd_table());
        let t0 = Instant::now();

        type_into_from(&mut app, "1.2.3", t0);
        app.tick(t0 + DEBOUNCE_DELAY);

        // Coercé à 0, le champ dépendant affiche 0 (jamais NaN)
        assert_eq!(app.to_input, "0");
    }

    #[test]
    fn test_fetch_guard_drops_second_trigger() {
        let mut app = App::with_table(usd_table());

        let first = app.request_refresh();
        assert_eq!(first.as_deref(), Some("USD"));
        assert!(app.is_updating);

        // Second déclencheur pendant le vol : abandonné
        assert_eq!(app.request_refresh(), None);

        // Une fois le résultat consommé, la garde retombe
        app.apply_rates(usd_table());
        assert!(!app.is_updating);
        assert_eq!(app.request_refresh().as_deref(), Some("USD"));
    }

    #[test]
    fn test_fetch_failed_keeps_previous_table() {
        let mut app = App::with_table(usd_table());
        let before = app.rates.clone();

        app.request_refresh();
        app.fetch_failed();

        assert!(!app.is_updating);
        assert_eq!(app.rates, before);
        // La ligne de comparaison continue d'afficher les derniers taux
        assert_eq!(app.comparison_line(), "1 USD = 90,00 RUB");
    }

    #[test]
    fn test_swap_scenario() {
        // Scénario de référence : 10 USD -> 900 RUB, puis swap et fetch
        // inverse reconstruisent ~10 USD
        let mut app = App::with_table(usd_table());
        let t0 = Instant::now();

        type_into_from(&mut app, "10", t0);
        app.tick(t0 + DEBOUNCE_DELAY);
        assert_eq!(app.to_input, "900");

        assert!(app.swap());
        assert_eq!(app.from_code, "RUB");
        assert_eq!(app.to_code, "USD");

        // Le swap déclenche un fetch avec la nouvelle base
        assert_eq!(app.request_refresh().as_deref(), Some("RUB"));
        app.apply_rates(rub_table());

        type_into_from(&mut app, "900", t0);
        app.tick(t0 + 2 * DEBOUNCE_DELAY);

        let back = parse_amount(&app.to_input);
        assert!((back - 10.0).abs() / 10.0 <= 1e-5, "obtenu {}", back);
    }

    #[test]
    fn test_swap_blocked_while_updating() {
        let mut app = App::with_table(usd_table());
        app.request_refresh();

        assert!(!app.swap());
        // Rien n'a été échangé
        assert_eq!(app.from_code, "USD");
        assert_eq!(app.to_code, "RUB");
    }

    #[test]
    fn test_chip_mutual_exclusion() {
        let mut app = App::with_table(usd_table());

        let active_count = |app: &App| {
            POPULAR_CURRENCIES
                .iter()
                .filter(|c| app.chip_is_active(c.code))
                .count()
        };

        // Au départ : USD active, et elle seule
        assert!(app.chip_is_active("USD"));
        assert_eq!(active_count(&app), 1);

        // Activer EUR désactive USD dans le même geste
        let eur = popular_position("EUR").unwrap();
        assert!(app.activate_chip(eur));
        assert!(app.chip_is_active("EUR"));
        assert!(!app.chip_is_active("USD"));
        assert_eq!(active_count(&app), 1);
    }

    #[test]
    fn test_chip_blocked_while_updating() {
        let mut app = App::with_table(usd_table());
        app.request_refresh();

        let eur = popular_position("EUR").unwrap();
        assert!(!app.activate_chip(eur));
        assert_eq!(app.from_code, "USD");
    }

    #[test]
    fn test_chip_cursor_saturates() {
        let mut app = App::with_table(usd_table());
        app.chip_cursor = 0;

        app.chip_left();
        assert_eq!(app.chip_cursor, 0);

        for _ in 0..50 {
            app.chip_right();
        }
        assert_eq!(app.chip_cursor, POPULAR_CURRENCIES.len() - 1);
    }

    #[test]
    fn test_set_to_recomputes_without_fetch() {
        let mut app = App::with_table(usd_table());

        app.set_to("EUR");

        // Pas de fetch : la table est déjà exprimée en base USD
        assert!(!app.is_updating);
        assert_eq!(app.to_input, "0.92");
        assert_eq!(app.comparison_line(), "1 USD = 0,92 EUR");
    }

    #[test]
    fn test_picker_flow() {
        let mut app = App::with_table(usd_table());

        app.open_picker(Side::To);
        assert!(app.is_picking());
        // Liste triée : EUR, RUB, USD ; positionnée sur RUB (le to actuel)
        assert_eq!(app.picker_codes(), vec!["EUR", "RUB", "USD"]);
        assert_eq!(app.picker_index, 1);

        app.picker_up();
        assert_eq!(app.picker_index, 0);
        app.picker_up(); // butée haute
        assert_eq!(app.picker_index, 0);

        let side = app.confirm_picker();
        assert_eq!(side, Some(Side::To));
        assert_eq!(app.to_code, "EUR");
        assert!(!app.is_picking());
    }

    #[test]
    fn test_picker_falls_back_to_popular_list() {
        let app = App::new(); // table vide
        let codes = app.picker_codes();
        assert_eq!(codes.len(), POPULAR_CURRENCIES.len());
        assert!(codes.contains(&"USD".to_string()));
    }

    #[test]
    fn test_debounce_timers_are_independent() {
        let delay = Duration::from_millis(100);
        let mut first = Debounce::new(delay);
        let mut second = Debounce::new(delay);
        let t0 = Instant::now();

        first.trigger(t0);
        second.trigger(t0 + Duration::from_millis(50));

        // Armer le second ne décale pas l'échéance du premier
        assert!(first.fire(t0 + delay));
        assert!(!second.fire(t0 + delay));
        assert!(second.fire(t0 + Duration::from_millis(150)));

        // fire est one-shot : plus rien après consommation
        assert!(!first.fire(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_debounce_retrigger_extends_deadline() {
        let delay = Duration::from_millis(100);
        let mut debounce = Debounce::new(delay);
        let t0 = Instant::now();

        debounce.trigger(t0);
        debounce.trigger(t0 + Duration::from_millis(80));

        // La première échéance est annulée par la seconde frappe
        assert!(!debounce.fire(t0 + Duration::from_millis(100)));
        assert!(debounce.fire(t0 + Duration::from_millis(180)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn test_cycle_focus() {
        let mut app = App::new();
        assert_eq!(app.focus, Focus::FromAmount);

        app.cycle_focus();
        assert_eq!(app.focus, Focus::ToAmount);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::Chips);
        app.cycle_focus();
        assert_eq!(app.focus, Focus::FromAmount);
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = App::new();
        assert!(!app.is_awaiting_quit_confirmation());

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        assert!(app.is_running());

        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }
}
