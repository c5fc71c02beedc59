// ============================================================================
// CoinView - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;     // Clients HTTP des services metadata et chart
pub mod app;     // État de l'application
pub mod chart;   // Contrat construct/destroy + surface terminal
pub mod config;  // Flags et variables d'environnement
pub mod detail;  // Contrôleur de la vue détail
pub mod models;  // Structures de données
pub mod ui;      // Interface utilisateur
pub mod worker;  // Thread des requêtes async
