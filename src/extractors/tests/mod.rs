mod ensemble_tests;
