mod generator_tests;
mod manager_tests;
