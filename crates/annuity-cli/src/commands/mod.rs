pub mod annuity;
