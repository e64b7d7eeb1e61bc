mod configuration_tests;
mod l2_scenario_tests;
mod l3_scenario_tests;
mod multi_exchange_scenario_tests;
mod pool_conservation_tests;
