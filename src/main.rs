// ============================================================================
// LazyChange - Convertisseur de devises en terminal
// ============================================================================
// Programme TUI qui convertit des montants entre deux devises avec des
// taux de change récupérés en direct depuis open.er-api.com
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle infinie qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime pour appels API
// 4. Channels : worker thread pour les fetchs en arrière-plan
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tracing::{debug, error, info};

use lazychange::api::rates::fetch_rates;
use lazychange::app::{App, Focus, Side, FIRST_DEFAULT_CURRENCY};
use lazychange::models::RateTable;
use lazychange::ui::{events::EventHandler, render};

// ============================================================================
// WorkerCommand : Commandes pour le worker thread
// ============================================================================
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des commandes au worker thread
// - Le worker thread exécute les tâches async (fetch API)
// - Communication via mpsc channels (multi-producer, single-consumer)
// ============================================================================

/// Commandes envoyées au worker thread pour exécuter des tâches async
#[derive(Debug, Clone)]
enum WorkerCommand {
    /// Récupérer la table des taux pour une devise de base
    /// CONCEPT : Background data loading
    /// - base: code de la devise de base (ex: "USD")
    FetchRates { base: String },
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum WorkerResult {
    /// Table des taux récupérée avec succès
    RatesLoaded { table: RateTable },

    /// Erreur lors du fetch (réseau ou réponse invalide)
    /// L'erreur est loggée puis avalée : la table précédente reste affichée
    FetchFailed { base: String, error: String },
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Tracing : framework moderne de logging structuré
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - Layer : transforme et route les logs
/// - EnvFilter : filtre par niveau (RUST_LOG env var)
/// - RollingFileAppender : rotation automatique
///
/// Les logs sont écrits dans :
/// - Linux/WSL : ~/.local/share/lazychange/logs/lazychange.log
/// - macOS : ~/Library/Application Support/lazychange/logs/lazychange.log
/// - Windows : C:\Users\<user>\AppData\Local\lazychange\logs\lazychange.log
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/lazychange/logs/lazychange.log
///
/// # Contrôler le niveau de log
/// RUST_LOG=debug cargo run
/// RUST_LOG=lazychange=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Répertoire de logs standard de la plateforme, ./logs en secours
    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("lazychange").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"));

    // Crée le répertoire s'il n'existe pas
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    // Configure la rotation quotidienne des logs
    // CONCEPT : Log rotation
    // - Rotation::DAILY : nouveau fichier chaque jour
    // - Ancien format : lazychange.log.2024-01-15
    // - Évite que les logs deviennent trop gros
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "lazychange.log");

    // Configure le subscriber (receveur de logs)
    // CONCEPT : Builder pattern avec layers
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender) // Écrit dans le fichier
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true) // Inclut le module (ex: lazychange::api::rates)
                .with_thread_ids(true) // Inclut l'ID du thread (utile pour async)
                .with_line_number(true), // Inclut le numéro de ligne
        )
        .with(
            // Filtre les logs par niveau
            // CONCEPT : EnvFilter
            // - RUST_LOG=debug : tous les logs debug+
            // - RUST_LOG=lazychange=trace : trace pour lazychange, info pour le reste
            // - Par défaut : debug pour lazychange, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazychange=debug,info".into()),
        )
        .init();

    // Premier log : confirme que le logging est initialisé
    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================
// CONCEPT RUST : Async dans sync
// - main() est synchrone (pour TUI)
// - Mais on a besoin d'async pour les appels API
// - Solution : tokio::runtime::Runtime pour exécuter du code async
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging FIRST
    // CONCEPT : Logging avant tout le reste
    // - Si init échoue, on affiche l'erreur et continue quand même
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    println!("LazyChange starting up");
    info!("LazyChange starting up");

    // Premier fetch des taux (appel API async, bloquant avant le TUI)
    info!(base = %FIRST_DEFAULT_CURRENCY, "Loading initial exchange rates");
    println!("📊 Récupération des taux de change ({})...\n", FIRST_DEFAULT_CURRENCY);

    let runtime = tokio::runtime::Runtime::new()?;
    let initial_table = match runtime.block_on(fetch_rates(FIRST_DEFAULT_CURRENCY)) {
        Ok(table) => {
            info!(base = %table.base, currencies = table.len(), "Initial rates loaded successfully");
            println!("✅ Taux chargés !\n");
            table
        }
        Err(e) => {
            // Erreur loggée puis avalée : l'application démarre quand même
            // avec une table vide, l'UI affiche le placeholder de chargement
            error!(error = %e, "Initial rates fetch failed");
            println!("⚠  Taux indisponibles pour l'instant ({})", e);
            println!("   L'application démarre, [r] pour réessayer.\n");
            RateTable::empty(FIRST_DEFAULT_CURRENCY)
        }
    };

    // Setup du terminal en mode TUI
    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    // Crée l'état de l'application avec la table chargée
    // CONCEPT RUST : Arc<Mutex<>> pour partage entre threads
    // - Arc : Reference counting pour ownership partagé
    // - Mutex : Protection contre les data races
    let app = Arc::new(Mutex::new(App::with_table(initial_table)));

    // Crée les channels pour communication avec le worker
    // CONCEPT RUST : mpsc channels
    // - command_tx/rx : pour envoyer des commandes au worker
    // - result_tx/rx : pour recevoir les résultats du worker
    let (command_tx, command_rx) = mpsc::channel::<WorkerCommand>();
    let (result_tx, result_rx) = mpsc::channel::<WorkerResult>();

    // Lance le worker thread en arrière-plan
    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx);

    // Crée le gestionnaire d'événements
    let events = EventHandler::new();

    // Exécute l'event loop
    info!("Starting event loop");
    let result = run(&mut terminal, app.clone(), &events, command_tx, result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui traite les commandes async
// - Reçoit des WorkerCommand via un channel (command_rx)
// - Envoie des WorkerResult via un autre channel (result_tx)
// - Permet de faire des appels API sans bloquer l'UI
//
// Le worker ne touche jamais App : la garde anti-chevauchement vit dans
// le contrôleur (request_refresh), le worker ne fait que fetcher
// ============================================================================

/// Worker thread qui exécute les fetchs de taux en arrière-plan
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : crée un thread OS
/// - tokio::runtime::Runtime : runtime async dans ce thread
/// - mpsc channels : communication inter-thread
///
/// # Arguments
/// * `command_rx` - Receiver pour recevoir les commandes
/// * `result_tx` - Sender pour envoyer les résultats
fn spawn_background_worker(
    command_rx: mpsc::Receiver<WorkerCommand>,
    result_tx: mpsc::Sender<WorkerResult>,
) {
    std::thread::spawn(move || {
        // Crée un runtime tokio pour ce thread
        // CONCEPT : Runtime per-thread
        // - Permet d'exécuter du code async dans un thread standard
        let runtime = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");

        // Boucle de traitement des commandes
        // CONCEPT : Command processing loop
        // - Attend une commande sur command_rx
        // - Traite la commande de manière async
        // - Envoie le résultat sur result_tx
        loop {
            match command_rx.recv() {
                Ok(command) => {
                    info!(?command, "Worker received command");

                    match command {
                        WorkerCommand::FetchRates { base } => {
                            // CONCEPT : block_on dans un worker thread
                            // - block_on() bloque le thread worker (pas l'UI)
                            // - L'UI continue à tourner normalement
                            let result =
                                runtime.block_on(async { fetch_rates(&base).await });

                            match result {
                                Ok(table) => {
                                    info!(base = %table.base, currencies = table.len(), "Exchange rates fetched successfully");
                                    let _ = result_tx.send(WorkerResult::RatesLoaded { table });
                                }
                                Err(e) => {
                                    error!(base = %base, error = %e, "Failed to fetch exchange rates");
                                    let _ = result_tx.send(WorkerResult::FetchFailed {
                                        base,
                                        error: e.to_string(),
                                    });
                                }
                            }
                        }
                    }
                }
                Err(_) => {
                    // Channel fermé, on quitte
                    info!("Worker thread exiting (channel closed)");
                    break;
                }
            }
        }
    });
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Game Loop / Event Loop Pattern
// - Loop infinie : while app.is_running()
// - À chaque itération :
//   1. Consommer les résultats du worker
//   2. Dessiner l'interface (render)
//   3. Traiter les événements (input)
//   4. Mettre à jour l'état (update : debounce)
// ============================================================================

/// Exécute la boucle principale de l'application
///
/// CONCEPT RUST : Arc<Mutex<>> pour partage entre threads
/// - Mutex::lock() : obtenir accès exclusif temporaire
/// - command_tx : envoyer commandes au worker
/// - result_rx : recevoir résultats du worker
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<WorkerCommand>,
    result_rx: mpsc::Receiver<WorkerResult>,
) -> Result<()> {
    loop {
        // Vérifie si l'app est toujours en cours d'exécution
        // CONCEPT : Lock scope minimisé
        // - Lock seulement pour lire is_running
        // - Unlock immédiat après le if
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // ========================================
        // 0. RÉSULTATS : Draine les résultats du worker
        // ========================================
        // CONCEPT : Non-blocking receive avec try_recv
        // - try_recv() ne bloque pas (contrairement à recv())
        // - On vide la file à chaque itération
        loop {
            match result_rx.try_recv() {
                Ok(WorkerResult::RatesLoaded { table }) => {
                    let mut app_lock = app.lock().unwrap();
                    app_lock.apply_rates(table);
                }
                Ok(WorkerResult::FetchFailed { base, error }) => {
                    // Erreur loggée puis avalée : les derniers taux restent
                    // affichés, seule la garde retombe
                    error!(base = %base, error = %error, "Rate fetch failed, keeping previous table");
                    let mut app_lock = app.lock().unwrap();
                    app_lock.fetch_failed();
                }
                Err(mpsc::TryRecvError::Empty) => {
                    // Pas de résultat, c'est normal
                    break;
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // ========================================
        // 1. RENDER : Dessine l'interface
        // ========================================
        // CONCEPT RUST : Closure avec clone d'Arc
        // - Lock à l'intérieur de la closure
        // - Unlock automatique à la fin de la closure
        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        // ========================================
        // 2. INPUT : Traite les événements
        // ========================================
        match events.next() {
            Ok(event) => {
                // La zone d'écran sert au hit-testing des clics souris
                let area = terminal.size().unwrap_or_default();
                let mut app_lock = app.lock().unwrap();
                handle_event(&mut app_lock, event, &command_tx, area);
            }
            Err(_) => {
                // Erreur lors de la lecture d'événement
            }
        }

        // ========================================
        // 3. UPDATE : Met à jour l'état
        // ========================================
        // C'est ici que les échéances de debounce (100ms) se résolvent
        {
            let mut app_lock = app.lock().unwrap();
            app_lock.tick(Instant::now());
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================
// CONCEPT : Event Handler Pattern
// - Sépare la logique de gestion des événements
// - Modifie l'état de app selon l'événement
// ============================================================================

/// Lève la garde anti-chevauchement et envoie la commande au worker
///
/// Si un fetch est déjà en vol, request_refresh retourne None et le
/// déclencheur est abandonné : rien n'est envoyé
fn request_rates(app: &mut App, command_tx: &mpsc::Sender<WorkerCommand>) {
    if let Some(base) = app.request_refresh() {
        let _ = command_tx.send(WorkerCommand::FetchRates { base });
    }
}

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching complexe avec guards
/// - Guard clauses (if) pour filtrer les événements
/// - Les arms du sélecteur passent avant ceux du convertisseur
/// - command_tx : pour envoyer des commandes au worker thread
/// - area : la taille de l'écran, pour le hit-testing des clics
fn handle_event(
    app: &mut App,
    event: lazychange::ui::events::Event,
    command_tx: &mpsc::Sender<WorkerCommand>,
    area: Rect,
) {
    use lazychange::ui::converter::{compute_zones, hit_test, ClickTarget};
    use lazychange::ui::events::{
        get_char_from_event, is_amount_char_event, is_backspace_event, is_down_event,
        is_enter_event, is_escape_event, is_from_picker_event, is_left_event, is_quit_event,
        is_refresh_event, is_right_event, is_space_event, is_swap_event, is_tab_event,
        is_to_picker_event, is_up_event, left_click_position, Event,
    };

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            // Touche 'q' : quit confirmation two-step
            // CONCEPT : Two-step confirmation pour éviter les quits accidentels
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // ========================================
        // Sélecteur modal de devise
        // ========================================

        // ESC : annuler le sélecteur
        Event::Key(_) if is_escape_event(&event) && app.is_picking() => {
            app.cancel_quit();
            debug!("User cancelled currency picker");
            app.cancel_picker();
        }

        // Enter : valider la devise sélectionnée
        Event::Key(_) if is_enter_event(&event) && app.is_picking() => {
            app.cancel_quit();
            if let Some(side) = app.confirm_picker() {
                info!(?side, from = %app.from_code, to = %app.to_code, "Currency selected");
                // Nouvelle base : il faut re-fetcher la table ; la devise
                // cible se recalcule sans fetch
                if side == Side::From {
                    request_rates(app, command_tx);
                }
            }
        }

        // Navigation dans la liste des codes
        Event::Key(_) if is_up_event(&event) && app.is_picking() => {
            app.cancel_quit();
            app.picker_up();
        }
        Event::Key(_) if is_down_event(&event) && app.is_picking() => {
            app.cancel_quit();
            app.picker_down();
        }

        // Toute autre touche pendant le sélecteur : avalée
        Event::Key(_) if app.is_picking() => {
            app.cancel_quit();
        }

        // ========================================
        // Écran convertisseur
        // ========================================

        // Chiffres et séparateur décimal : saisie dans le champ focalisé
        Event::Key(_) if is_amount_char_event(&event) => {
            app.cancel_quit();
            if let Some(c) = get_char_from_event(&event) {
                app.edit_char(c, Instant::now());
            }
        }

        // Backspace : supprimer le dernier caractère
        Event::Key(_) if is_backspace_event(&event) => {
            app.cancel_quit();
            app.edit_backspace(Instant::now());
        }

        // Tab : zone de focus suivante (from -> to -> puces)
        Event::Key(_) if is_tab_event(&event) => {
            app.cancel_quit();
            app.cycle_focus();
        }

        // 's' : échange la paire puis re-fetch avec la nouvelle base
        Event::Key(_) if is_swap_event(&event) => {
            app.cancel_quit();
            if app.swap() {
                request_rates(app, command_tx);
            }
        }

        // 'r' : rafraîchissement manuel des taux
        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_quit();
            info!("User requested manual refresh");
            request_rates(app, command_tx);
        }

        // 'f' / 't' : ouvrir le sélecteur de devise
        Event::Key(_) if is_from_picker_event(&event) => {
            app.cancel_quit();
            app.open_picker(Side::From);
        }
        Event::Key(_) if is_to_picker_event(&event) => {
            app.cancel_quit();
            app.open_picker(Side::To);
        }

        // Flèches : déplacer le surlignage des puces (focus puces requis)
        Event::Key(_) if is_left_event(&event) && app.focus == Focus::Chips => {
            app.cancel_quit();
            app.chip_left();
        }
        Event::Key(_) if is_right_event(&event) && app.focus == Focus::Chips => {
            app.cancel_quit();
            app.chip_right();
        }

        // Enter ou Espace sur une puce : cette devise devient la base
        Event::Key(_)
            if (is_enter_event(&event) || is_space_event(&event))
                && app.focus == Focus::Chips =>
        {
            app.cancel_quit();
            if app.activate_chip(app.chip_cursor) {
                request_rates(app, command_tx);
            }
        }

        // Clic souris : focus, swap ou puce selon la zone touchée
        Event::Mouse(_) if !app.is_picking() => {
            app.cancel_quit();
            if let Some((x, y)) = left_click_position(&event) {
                let zones = compute_zones(area);
                match hit_test(&zones, x, y) {
                    Some(ClickTarget::FromAmount) => {
                        debug!("Mouse focus on from amount");
                        app.set_focus(Focus::FromAmount);
                    }
                    Some(ClickTarget::ToAmount) => {
                        debug!("Mouse focus on to amount");
                        app.set_focus(Focus::ToAmount);
                    }
                    Some(ClickTarget::Swap) => {
                        if app.swap() {
                            request_rates(app, command_tx);
                        }
                    }
                    Some(ClickTarget::Chip(index)) => {
                        app.set_focus(Focus::Chips);
                        if app.activate_chip(index) {
                            request_rates(app, command_tx);
                        }
                    }
                    None => {}
                }
            }
        }

        Event::Tick => {
            // Tick régulier : les debounces avancent dans run() via tick()
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation si active
            app.cancel_quit();
        }

        _ => {
            // Autres événements : ignorés
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// CONCEPT RUST : Terminal raw mode
// - Raw mode : on reçoit tous les caractères directement
// - Alternate screen : écran secondaire (ne pollue pas l'historique)
// - Crossterm gère tout ça de manière cross-platform
//
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
///
/// CONCEPT RUST : Error propagation avec ?
/// - Chaque opération peut échouer
/// - ? propage automatiquement les erreurs
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    // Active le raw mode
    // CONCEPT : Raw mode
    // - Les caractères ne sont pas affichés automatiquement
    // - Pas de buffering ligne par ligne
    enable_raw_mode()?;

    // Configure le terminal
    // CONCEPT : Alternate screen
    // - Écran secondaire qui ne pollue pas l'historique
    // - Quand on quitte, l'écran précédent est restauré
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture // Souris : focus des champs et clics sur les puces
    )?;

    // Crée le backend crossterm
    let backend = CrosstermBackend::new(stdout);

    // Crée le terminal ratatui
    // CONCEPT RUST : Ownership
    // - Terminal prend ownership de backend
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// CONCEPT : Cleanup
/// - Appelé dans main() même en cas d'erreur
/// - Restaure le terminal pour ne pas le laisser cassé
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    // Désactive le raw mode
    disable_raw_mode()?;

    // Restaure le terminal
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    // Affiche le curseur
    terminal.show_cursor()?;

    Ok(())
}
